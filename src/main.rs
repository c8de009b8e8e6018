fn main() {
    branchtext::cli::run();
}
