//! Render3 Interfaces
//!
//! Shared data types for the view tree and queries.

pub mod definition;
pub mod handle;
pub mod node;
pub mod query;
pub mod view;
