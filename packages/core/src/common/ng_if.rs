//! NgIf
//!
//! Shows the then-template while the condition holds and the optional
//! else-template otherwise. Both views live in the container of the
//! placeholder the directive sits on.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;
use crate::render3::engine::QueryEngine;
use crate::render3::interfaces::handle::{NodeId, TemplateId, ViewId};

#[derive(Debug, Clone)]
pub struct NgIf {
    anchor: NodeId,
    then_template: TemplateId,
    else_template: Option<TemplateId>,
    condition: bool,
    then_view: Option<ViewId>,
    else_view: Option<ViewId>,
}

impl NgIf {
    /// Binds to the template placeholder `anchor` and renders for the initial
    /// `condition`.
    pub fn new(engine: &mut QueryEngine, anchor: NodeId, condition: bool) -> Result<Self> {
        Self::with_else(engine, anchor, None, condition)
    }

    pub fn with_else(
        engine: &mut QueryEngine,
        anchor: NodeId,
        else_template: Option<TemplateId>,
        condition: bool,
    ) -> Result<Self> {
        let then_template = engine.template_of(anchor)?;
        let mut ng_if = NgIf {
            anchor,
            then_template,
            else_template,
            condition,
            then_view: None,
            else_view: None,
        };
        ng_if.update_view(engine)?;
        Ok(ng_if)
    }

    pub fn condition(&self) -> bool {
        self.condition
    }

    pub fn then_view(&self) -> Option<ViewId> {
        self.then_view
    }

    pub fn else_view(&self) -> Option<ViewId> {
        self.else_view
    }

    /// Updates the condition. Returns whether the container changed.
    pub fn set_condition(&mut self, engine: &mut QueryEngine, condition: bool) -> Result<bool> {
        if condition == self.condition {
            return Ok(false);
        }
        self.condition = condition;
        self.update_view(engine)
    }

    fn context(&self) -> Value {
        json!({ "$implicit": self.condition, "ngIf": self.condition })
    }

    fn update_view(&mut self, engine: &mut QueryEngine) -> Result<bool> {
        if self.condition {
            if self.then_view.is_some() {
                return Ok(false);
            }
            if let Some(view) = self.else_view.take() {
                engine.destroy_view(view)?;
            }
            let view = engine.create_embedded_view(self.then_template, self.context())?;
            engine.insert_view(self.anchor, view, 0)?;
            self.then_view = Some(view);
        } else {
            if self.else_view.is_some() {
                return Ok(false);
            }
            let had_then = self.then_view.is_some();
            if let Some(view) = self.then_view.take() {
                engine.destroy_view(view)?;
            }
            match self.else_template {
                Some(template) => {
                    let view = engine.create_embedded_view(template, self.context())?;
                    engine.insert_view(self.anchor, view, 0)?;
                    self.else_view = Some(view);
                }
                None if !had_then => return Ok(false),
                None => {}
            }
        }
        debug!(anchor = %self.anchor, condition = self.condition, "ngIf updated");
        Ok(true)
    }
}
