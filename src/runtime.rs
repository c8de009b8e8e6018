//! Runtime module for branchtext documents
//!
//! Interactive walks over a validated document. The document itself is
//! never touched; everything a walk records lives in [`Selections`].

pub mod session;

pub use session::{Selections, Session, SessionError, Step, SELECTED_MARK};
