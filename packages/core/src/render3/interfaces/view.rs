//! View Interfaces

use serde_json::Value;

use super::handle::{NodeId, TemplateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// A root view with no host.
    Root,
    /// The own view of a component, hosted by the component's node.
    Component { host: NodeId },
    /// A view instantiated from a template, attachable to any container.
    Embedded { template: TemplateId },
}

/// Per-view data stored in the tree arena.
#[derive(Debug, Clone)]
pub struct ViewData {
    pub(crate) kind: ViewKind,
    /// Every node of the view in creation order.
    pub(crate) nodes: Vec<NodeId>,
    /// Top-level nodes in document order.
    pub(crate) roots: Vec<NodeId>,
    /// Container anchor this view is currently attached to.
    pub(crate) attached_to: Option<NodeId>,
    pub(crate) context: Value,
}

impl ViewData {
    pub(crate) fn new(kind: ViewKind, context: Value) -> Self {
        ViewData {
            kind,
            nodes: Vec::new(),
            roots: Vec::new(),
            attached_to: None,
            context,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn attached_to(&self) -> Option<NodeId> {
        self.attached_to
    }

    /// Template context of an embedded view (`Value::Null` when none).
    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, ViewKind::Embedded { .. })
    }
}
