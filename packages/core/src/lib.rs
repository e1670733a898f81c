#![deny(clippy::all)]

//! Angular Core Runtime - Render3 Queries
//!
//! View and content query resolution over a mutable tree of views: static
//! nodes declared by templates plus embedded views attached to containers.

// Core modules
pub mod config;
pub mod error;

// Runtime modules
pub mod common;
pub mod linker;
pub mod render3;

// Re-exports
pub use common::{ForOfChanges, NgForOf, NgIf};
pub use config::EngineConfig;
pub use error::{QueryError, Result};
pub use linker::query_list::{QueryList, QueryListEvent, Subscription};
pub use linker::refs::{ElementRef, QueryValue, TemplateRef, ViewContainerRef};
pub use render3::change_detection::LifecycleHooks;
pub use render3::engine::QueryEngine;
pub use render3::interfaces::definition::{DirectiveDef, DirectiveRegistry};
pub use render3::interfaces::handle::{
    DirectiveInstance, DirectiveType, InstanceId, NodeId, TemplateId, ViewId,
};
pub use render3::interfaces::node::{LocalRef, NodeData, NodeKind, RefTarget};
pub use render3::interfaces::query::{QueryDefinition, QueryFlags, QueryPredicate, QueryToken};
pub use render3::interfaces::view::{ViewData, ViewKind};
pub use render3::query::registry::{QueryOwner, QueryRegistry, QueryScope, QuerySlot, QueryState};
pub use render3::tree::{TemplateBody, ViewBuilder, ViewTree};
