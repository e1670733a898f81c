//! NgForOf
//!
//! Renders one embedded view per item. Reconciliation keeps the view of an
//! item that is still present (matched by value, first unmatched occurrence
//! wins), moves it to its new index, destroys views of removed items and
//! creates views for new ones.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;
use crate::render3::engine::QueryEngine;
use crate::render3::interfaces::handle::{NodeId, TemplateId, ViewId};

#[derive(Debug, Clone)]
pub struct NgForOf {
    anchor: NodeId,
    template: TemplateId,
    items: Vec<Value>,
    views: Vec<ViewId>,
}

/// Counts of the operations one reconciliation applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForOfChanges {
    pub created: usize,
    pub moved: usize,
    pub removed: usize,
}

impl ForOfChanges {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.moved == 0 && self.removed == 0
    }
}

impl NgForOf {
    pub fn new(engine: &QueryEngine, anchor: NodeId) -> Result<Self> {
        Ok(NgForOf {
            anchor,
            template: engine.template_of(anchor)?,
            items: Vec::new(),
            views: Vec::new(),
        })
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    /// Reconciles the container against `items`.
    pub fn set_items(&mut self, engine: &mut QueryEngine, items: Vec<Value>) -> Result<ForOfChanges> {
        let mut changes = ForOfChanges::default();

        // Pair each new item with the first unmatched old occurrence.
        let mut matched = vec![false; self.items.len()];
        let assignment: Vec<Option<usize>> = items
            .iter()
            .map(|item| {
                let found = self
                    .items
                    .iter()
                    .enumerate()
                    .position(|(i, old)| !matched[i] && old == item);
                if let Some(i) = found {
                    matched[i] = true;
                }
                found
            })
            .collect();

        for index in (0..self.views.len()).rev() {
            if !matched[index] {
                engine.remove_view(self.anchor, index)?;
                changes.removed += 1;
            }
        }
        let mut current: Vec<(Option<usize>, ViewId)> = self
            .views
            .iter()
            .enumerate()
            .filter(|(i, _)| matched[*i])
            .map(|(i, view)| (Some(i), *view))
            .collect();

        for (index, old) in assignment.iter().enumerate() {
            match old {
                Some(old) => {
                    let from = current
                        .iter()
                        .position(|(i, _)| *i == Some(*old))
                        .unwrap_or(index);
                    if from != index {
                        engine.move_view(self.anchor, from, index)?;
                        let entry = current.remove(from);
                        current.insert(index, entry);
                        changes.moved += 1;
                    }
                }
                None => {
                    let context = row_context(&items[index], index, items.len());
                    let view = engine.create_and_insert(self.anchor, index, context)?;
                    current.insert(index, (None, view));
                    changes.created += 1;
                }
            }
        }

        let count = items.len();
        for (index, ((_, view), item)) in current.iter().zip(&items).enumerate() {
            engine.set_view_context(*view, row_context(item, index, count))?;
        }

        self.views = current.into_iter().map(|(_, view)| view).collect();
        self.items = items;
        if !changes.is_empty() {
            debug!(anchor = %self.anchor, ?changes, "ngForOf reconciled");
        }
        Ok(changes)
    }
}

fn row_context(item: &Value, index: usize, count: usize) -> Value {
    json!({
        "$implicit": item,
        "index": index,
        "count": count,
        "first": index == 0,
        "last": index + 1 == count,
    })
}
