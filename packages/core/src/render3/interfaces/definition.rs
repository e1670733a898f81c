//! Directive Definitions
//!
//! Metadata the runtime needs about each directive type: its name, the names
//! it is exported under for template references, and whether it is a
//! component.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{QueryError, Result};

use super::handle::DirectiveType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDef {
    /// Name of the directive type.
    pub name: String,
    /// Names under which the directive can be referenced (`#ref="exportName"`).
    pub export_as: SmallVec<[String; 1]>,
    /// Whether the directive is a component (owns a view of its own).
    pub is_component: bool,
}

impl DirectiveDef {
    pub fn directive(name: impl Into<String>) -> Self {
        DirectiveDef {
            name: name.into(),
            export_as: SmallVec::new(),
            is_component: false,
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        DirectiveDef {
            is_component: true,
            ..Self::directive(name)
        }
    }

    pub fn exported_as(mut self, export_name: impl Into<String>) -> Self {
        self.export_as.push(export_name.into());
        self
    }

    pub fn is_exported_as(&self, export_name: &str) -> bool {
        self.export_as.iter().any(|name| name == export_name)
    }
}

/// Registered directive types, keyed by name. A `DirectiveType` is the
/// registration index.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    defs: IndexMap<String, DirectiveDef>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: DirectiveDef) -> Result<DirectiveType> {
        if self.defs.contains_key(&def.name) {
            return Err(QueryError::DuplicateDirective(def.name));
        }
        let (index, _) = self.defs.insert_full(def.name.clone(), def);
        Ok(DirectiveType::new(index))
    }

    pub fn get(&self, directive: DirectiveType) -> Option<&DirectiveDef> {
        self.defs.get_index(directive.as_usize()).map(|(_, def)| def)
    }

    pub fn lookup(&self, name: &str) -> Option<DirectiveType> {
        self.defs.get_index_of(name).map(DirectiveType::new)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
