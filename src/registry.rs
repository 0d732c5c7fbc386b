//! Startup registry of documented controllers.
//!
//! Controllers are registered with their fully qualified name, e.g.
//! `App::Http::Controllers::WidgetController`; each holds its actions in declaration
//! order. An action carries at most one [`ActionDescriptor`]; actions without one are
//! never invoked.

use crate::descriptor::ActionDescriptor;
use crate::handler::{Invocable, SourceLocation};

/// One handler method of a controller.
pub struct ActionEntry {
    pub name: String,
    pub descriptor: Option<ActionDescriptor>,
    pub handler: Box<dyn Invocable>,
    /// Where the action was registered
    pub location: SourceLocation,
}

/// A documented controller and its actions.
pub struct Controller {
    name: String,
    actions: Vec<ActionEntry>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Adds a documented action.
    #[track_caller]
    pub fn action(
        mut self,
        name: impl Into<String>,
        descriptor: ActionDescriptor,
        handler: impl Invocable + 'static,
    ) -> Self {
        self.actions.push(ActionEntry {
            name: name.into(),
            descriptor: Some(descriptor),
            handler: Box::new(handler),
            location: SourceLocation::caller(),
        });
        self
    }

    /// Adds an action that carries no descriptor and is skipped by the engine.
    #[track_caller]
    pub fn undocumented(mut self, name: impl Into<String>, handler: impl Invocable + 'static) -> Self {
        self.actions.push(ActionEntry {
            name: name.into(),
            descriptor: None,
            handler: Box::new(handler),
            location: SourceLocation::caller(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last namespace segment of the name.
    pub fn short_name(&self) -> &str {
        crate::naming::last_segment(&self.name)
    }

    pub fn actions(&self) -> &[ActionEntry] {
        &self.actions
    }
}

/// All documented controllers, in registration order.
#[derive(Default)]
pub struct Registry {
    controllers: Vec<Controller>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, controller: Controller) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Controller> {
        self.controllers.iter().find(|c| c.name == name)
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
