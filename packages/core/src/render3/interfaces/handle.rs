//! Runtime Handles
//!
//! Stable identifiers into the view tree arenas. Handles are never reused:
//! once a view or node is destroyed its handle stays invalid, so two handles
//! compare equal only if they denote the same entity.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub fn new(id: usize) -> Self {
                $name(id)
            }

            pub fn as_usize(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// A root, component or embedded view.
    ViewId,
    "view"
);

define_handle!(
    /// A node in any view.
    NodeId,
    "node"
);

define_handle!(
    /// A template declared by a template placeholder node.
    TemplateId,
    "template"
);

define_handle!(
    /// A registered directive or component type.
    DirectiveType,
    "directive"
);

define_handle!(
    /// A constructed directive or component instance.
    InstanceId,
    "instance"
);

/// A directive instance together with its type, as attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectiveInstance {
    pub directive: DirectiveType,
    pub instance: InstanceId,
}

impl DirectiveInstance {
    pub fn new(directive: DirectiveType, instance: InstanceId) -> Self {
        DirectiveInstance {
            directive,
            instance,
        }
    }
}

impl fmt::Display for DirectiveInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.instance, self.directive)
    }
}
