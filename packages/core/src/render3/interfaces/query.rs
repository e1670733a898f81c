//! Query Interfaces
//!
//! Query definitions as declared on components (view queries) and
//! directives (content queries).

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::config::EMIT_DISTINCT_CHANGES_ONLY_DEFAULT_VALUE;

use super::handle::DirectiveType;

bitflags! {
    /// A set of flags to be used with Queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueryFlags: u32 {
        /// Whether or not the query should descend into children.
        const DESCENDANTS = 0b0001;
        /// The query can be computed statically.
        const IS_STATIC = 0b0010;
        /// If the `QueryList` should fire change event only if actual change was computed.
        const EMIT_DISTINCT_CHANGES_ONLY = 0b0100;
    }
}

/// A token that can be located on a node: a directive type or one of the
/// framework-level handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryToken {
    /// An instance of the given directive or component type.
    Directive(DirectiveType),
    /// The element handle of an element, element-container or template node.
    ElementRef,
    /// The template handle of a template placeholder.
    TemplateRef,
    /// The view container handle of a template placeholder.
    ViewContainerRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPredicate {
    /// Match nodes on which the token can be located.
    Type(QueryToken),
    /// Match nodes declaring any of the given local reference names.
    Names(SmallVec<[String; 2]>),
}

impl QueryPredicate {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryPredicate::Names(names.into_iter().map(Into::into).collect())
    }
}

/// A single query declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    /// The predicate for the query.
    pub predicate: QueryPredicate,
    /// Whether to include only direct children or all descendants.
    pub descendants: bool,
    /// A token to read from each matched node instead of the default value.
    pub read: Option<QueryToken>,
    /// Whether the query is resolved once and never recomputed.
    pub is_static: bool,
    /// If the `QueryList` should fire change event only if actual change was computed.
    pub emit_distinct_changes_only: bool,
}

impl QueryDefinition {
    pub fn new(predicate: QueryPredicate) -> Self {
        QueryDefinition {
            predicate,
            descendants: false,
            read: None,
            is_static: false,
            emit_distinct_changes_only: EMIT_DISTINCT_CHANGES_ONLY_DEFAULT_VALUE,
        }
    }

    pub fn by_type(token: QueryToken) -> Self {
        Self::new(QueryPredicate::Type(token))
    }

    pub fn by_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(QueryPredicate::names(names))
    }

    pub fn descendants(mut self, descendants: bool) -> Self {
        self.descendants = descendants;
        self
    }

    pub fn read(mut self, token: QueryToken) -> Self {
        self.read = Some(token);
        self
    }

    pub fn static_(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn emit_distinct_changes_only(mut self, distinct: bool) -> Self {
        self.emit_distinct_changes_only = distinct;
        self
    }

    /// Translates the definition into its flag set.
    pub fn flags(&self) -> QueryFlags {
        let mut flags = QueryFlags::empty();
        if self.descendants {
            flags |= QueryFlags::DESCENDANTS;
        }
        if self.is_static {
            flags |= QueryFlags::IS_STATIC;
        }
        if self.emit_distinct_changes_only {
            flags |= QueryFlags::EMIT_DISTINCT_CHANGES_ONLY;
        }
        flags
    }

    pub fn from_flags(predicate: QueryPredicate, flags: QueryFlags, read: Option<QueryToken>) -> Self {
        QueryDefinition {
            predicate,
            descendants: flags.contains(QueryFlags::DESCENDANTS),
            read,
            is_static: flags.contains(QueryFlags::IS_STATIC),
            emit_distinct_changes_only: flags.contains(QueryFlags::EMIT_DISTINCT_CHANGES_ONLY),
        }
    }
}
