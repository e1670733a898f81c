//! Linker
//!
//! Public handles and the live `QueryList` collection.

pub mod query_list;
pub mod refs;
