//! Document content handling for the config editor
//!
//! Provides the building blocks the sync controller runs at every flush:
//! pointer addressing into JSON documents, empty-value pruning with
//! canonical key ordering, and semantic diffs between document versions.

pub mod diff;
pub mod error;
pub mod normalize;
pub mod ordering;
pub mod pointer;

pub use diff::{SemanticChange, SemanticDiff};
pub use error::{Error, Result};
pub use normalize::{normalize, prune_empty};
pub use ordering::{KeyOrdering, PreserveOrder, SchemaOrder, SortedKeys};
pub use pointer::{Segment, format_pointer, parse_pointer, to_indexed_pointer};
