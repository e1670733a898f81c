//! Linker References
//!
//! Handles a query can produce for a matched node. Equality is identity: two
//! handles are equal exactly when they denote the same node, template or
//! directive instance.

use crate::render3::interfaces::handle::{DirectiveInstance, DirectiveType, NodeId, TemplateId};

/// Handle to a rendered element or grouping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub node: NodeId,
}

/// Handle to a reusable template, as declared by a template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateRef {
    pub template: TemplateId,
    pub anchor: NodeId,
}

/// Handle to the view container anchored at a template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewContainerRef {
    pub anchor: NodeId,
}

/// A resolved query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryValue {
    Element(ElementRef),
    Template(TemplateRef),
    ViewContainer(ViewContainerRef),
    Instance(DirectiveInstance),
}

impl QueryValue {
    /// The node this value was read from, if the value is a node handle.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            QueryValue::Element(r) => Some(r.node),
            QueryValue::Template(r) => Some(r.anchor),
            QueryValue::ViewContainer(r) => Some(r.anchor),
            QueryValue::Instance(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementRef> {
        match self {
            QueryValue::Element(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<TemplateRef> {
        match self {
            QueryValue::Template(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_view_container(&self) -> Option<ViewContainerRef> {
        match self {
            QueryValue::ViewContainer(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<DirectiveInstance> {
        match self {
            QueryValue::Instance(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_instance_of(&self, directive: DirectiveType) -> bool {
        matches!(self, QueryValue::Instance(d) if d.directive == directive)
    }
}
