//! Runtime Errors
//!
//! Errors raised by misuse of the view tree and query surfaces. A query that
//! matches nothing, or a read token that cannot be resolved on a node, is not
//! an error: it simply contributes no results.

use thiserror::Error;

use crate::render3::interfaces::handle::{
    DirectiveInstance, DirectiveType, NodeId, TemplateId, ViewId,
};
use crate::render3::interfaces::node::NodeKind;
use crate::render3::query::registry::QuerySlot;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0} does not exist or has been destroyed")]
    UnknownView(ViewId),

    #[error("{0} does not exist or has been destroyed")]
    UnknownNode(NodeId),

    #[error("{0} does not exist or its declaring node has been destroyed")]
    UnknownTemplate(TemplateId),

    #[error("{0} is not a registered directive type")]
    UnknownDirective(DirectiveType),

    #[error("{0} does not exist or its host has been destroyed")]
    UnknownInstance(DirectiveInstance),

    #[error("a directive named '{0}' is already registered")]
    DuplicateDirective(String),

    #[error("{node} does not belong to {view}")]
    NodeInDifferentView { node: NodeId, view: ViewId },

    #[error("{node} is a {kind} node and cannot have children")]
    LeafNode { node: NodeId, kind: NodeKind },

    #[error("{node} is a {kind} node and cannot host directives or references")]
    InvalidHost { node: NodeId, kind: NodeKind },

    #[error("{0} is not a template placeholder and has no view container")]
    NotAContainer(NodeId),

    #[error("{0} is not an embedded view")]
    NotAnEmbeddedView(ViewId),

    #[error("{0} is already attached to a view container")]
    ViewAlreadyAttached(ViewId),

    #[error("inserting {view} at {anchor} would make the view contain itself")]
    CyclicInsertion { view: ViewId, anchor: NodeId },

    #[error("index {index} is out of bounds for a container of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("{0} already hosts a component")]
    MultipleComponents(NodeId),

    #[error("{0} does not host a component")]
    NotAComponentHost(NodeId),

    #[error("{0} already owns a component view")]
    ComponentViewExists(NodeId),

    #[error("export of name '{name}' not found on {node}")]
    ExportNotFound { name: String, node: NodeId },

    #[error("reference '{name}' is already declared on {node}")]
    DuplicateLocalRef { name: String, node: NodeId },

    #[error("{0} is not a registered query")]
    UnknownQuery(QuerySlot),

    #[error("{0} has been destroyed")]
    QueryDestroyed(QuerySlot),
}
