//! Node Interfaces
//!
//! A node is a single position in a view: an element, a grouping
//! element-container, a template placeholder or a text node.

use std::fmt;

use smallvec::SmallVec;

use super::handle::{DirectiveInstance, NodeId, TemplateId, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A rendered element with a tag name.
    Element,
    /// A grouping node with no rendered tag (`<ng-container>`).
    ElementContainer,
    /// A template placeholder (`<ng-template>`) anchoring a view container.
    Template,
    /// A text node.
    Text,
}

impl NodeKind {
    /// Whether nodes of this kind can have static children.
    pub fn is_parent(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::ElementContainer)
    }

    /// Whether nodes of this kind can carry directives and local references.
    pub fn is_host(self) -> bool {
        !matches!(self, NodeKind::Text)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Element => "element",
            NodeKind::ElementContainer => "element-container",
            NodeKind::Template => "template",
            NodeKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// What a local reference resolves to by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    /// The node itself: its element handle, or its template handle for a
    /// template placeholder.
    Node,
    /// A directive instance on the node, selected by export name or, for a
    /// component host, the component itself.
    Instance(DirectiveInstance),
}

/// A locally declared reference name (`#name` or `#name="exportName"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRef {
    pub name: String,
    pub export: Option<String>,
    pub target: RefTarget,
}

/// Per-node data stored in the tree arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) view: ViewId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) tag: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) directives: SmallVec<[DirectiveInstance; 2]>,
    pub(crate) local_refs: SmallVec<[LocalRef; 2]>,
    pub(crate) component_view: Option<ViewId>,
    pub(crate) template: Option<TemplateId>,
    pub(crate) container: Vec<ViewId>,
}

impl NodeData {
    pub(crate) fn new(
        kind: NodeKind,
        view: ViewId,
        parent: Option<NodeId>,
        tag: Option<String>,
    ) -> Self {
        NodeData {
            kind,
            view,
            parent,
            tag,
            children: Vec::new(),
            directives: SmallVec::new(),
            local_refs: SmallVec::new(),
            component_view: None,
            template: None,
            container: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The view this node was declared in.
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Tag name for elements, text content for text nodes.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn directives(&self) -> &[DirectiveInstance] {
        &self.directives
    }

    pub fn local_refs(&self) -> &[LocalRef] {
        &self.local_refs
    }

    pub fn local_ref(&self, name: &str) -> Option<&LocalRef> {
        self.local_refs.iter().find(|r| r.name == name)
    }

    pub fn component_view(&self) -> Option<ViewId> {
        self.component_view
    }

    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    /// Embedded views currently attached to this node's container, in index
    /// order. Always empty for nodes that are not template placeholders.
    pub fn container(&self) -> &[ViewId] {
        &self.container
    }
}
