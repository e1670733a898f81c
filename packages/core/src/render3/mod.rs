//! Render3
//!
//! The view tree, query resolution and the change detection driver.

pub mod change_detection;
pub mod engine;
pub mod interfaces;
pub mod query;
pub mod tree;
