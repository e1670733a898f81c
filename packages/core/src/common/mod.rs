//! Common
//!
//! Structural directives that drive view containers through the engine.

pub mod ng_for_of;
pub mod ng_if;

pub use ng_for_of::{ForOfChanges, NgForOf};
pub use ng_if::NgIf;
