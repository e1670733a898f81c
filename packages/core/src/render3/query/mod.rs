//! Render3 Queries
//!
//! Matching, traversal and registration of view and content queries.

pub mod matcher;
pub mod registry;
pub mod walker;
