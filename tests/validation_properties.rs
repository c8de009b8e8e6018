// tests/validation_properties.rs
//
// Random goto-graphs where every section has a forward path to the last
// section must validate; targeted damage must produce the matching error.

mod common;

use common::{graph_text, section_name, validation_of, Edge};
use proptest::prelude::*;

use branchtext::ValidationError;

/// Edges for section `index` of `len`, never targeting `avoid`.
///
/// Non-terminal sections get a forward edge first, so there is always a way
/// on; the terminal section always keeps a choice that falls through.
fn section_edges(index: usize, len: usize, avoid: Option<usize>) -> BoxedStrategy<Vec<Edge>> {
    let allowed = |t: &usize| Some(*t) != avoid;
    let anywhere: Vec<usize> = (1..len).filter(allowed).collect();
    let extra = prop::collection::vec(prop::sample::select(anywhere), 0..3);

    if index == len - 1 {
        return extra
            .prop_map(|targets| {
                let mut edges: Vec<Edge> = targets.into_iter().map(Some).collect();
                edges.push(None);
                edges
            })
            .boxed();
    }

    let forward: Vec<usize> = (index + 1..len).filter(allowed).collect();
    (prop::sample::select(forward), extra)
        .prop_map(|(next, targets)| {
            let mut edges = vec![Some(next)];
            edges.extend(targets.into_iter().map(Some));
            edges
        })
        .boxed()
}

fn live_graph() -> impl Strategy<Value = Vec<Vec<Edge>>> {
    (2usize..8).prop_flat_map(|len| {
        (0..len)
            .map(|index| section_edges(index, len, None))
            .collect::<Vec<_>>()
    })
}

/// A live graph plus one extra section, just before the terminal one, that
/// only loops onto itself and that nothing jumps to.
fn graph_with_dead_section() -> impl Strategy<Value = (Vec<Vec<Edge>>, usize)> {
    (2usize..7).prop_flat_map(|n| {
        let dead = n - 1;
        let sections: Vec<_> = (0..=n)
            .map(|index| {
                if index == dead {
                    Just(vec![Some(dead)]).boxed()
                } else {
                    section_edges(index, n + 1, Some(dead))
                }
            })
            .collect();
        (sections, Just(dead))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_forward_reachable_graphs_validate(graph in live_graph()) {
        let text = graph_text(&graph);
        prop_assert_eq!(validation_of(&text), Ok(()), "{}", text);
    }

    #[test]
    fn test_unknown_target_is_reported(graph in live_graph()) {
        let first = graph[0][0].expect("start section always jumps forward");
        let text = graph_text(&graph).replacen(
            &format!("GO TO {}\n", section_name(first)),
            "GO TO Missing\n",
            1,
        );
        prop_assert_eq!(
            validation_of(&text),
            Err(ValidationError::UnknownSectionReference("Missing".into()))
        );
    }

    #[test]
    fn test_renamed_heading_is_a_duplicate(graph in live_graph()) {
        prop_assume!(graph.len() >= 3);
        let last = graph.len() - 1;
        let text = graph_text(&graph).replacen(
            &format!("== {} ==", section_name(last)),
            &format!("== {} ==", section_name(1)),
            1,
        );
        prop_assert_eq!(
            validation_of(&text),
            Err(ValidationError::DuplicateSectionName(section_name(1)))
        );
    }

    #[test]
    fn test_isolated_self_loop_is_a_dead_end((graph, dead) in graph_with_dead_section()) {
        let text = graph_text(&graph);
        prop_assert_eq!(
            validation_of(&text),
            Err(ValidationError::DeadEndLoop(section_name(dead))),
            "{}",
            text
        );
    }
}
