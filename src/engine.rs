//! Per-action documentation driver.
//!
//! For every discovered controller that is registered, and every action of it that
//! carries a descriptor, the engine:
//!
//! 1. checks that the descriptor declares a url and a method,
//! 2. synthesizes the request context and resolves the handler's parameters,
//! 3. invokes the handler (or adopts a response captured while resolving),
//! 4. in strict mode, registers the endpoint in its group document and merges the
//!    operation into the action document.
//!
//! Fatal errors are returned to the caller; nothing after them is processed.

use crate::container::Container;
use crate::descriptor::ActionDescriptor;
use crate::document_store::DocumentStore;
use crate::error::{Error, Result};
use crate::handler::HandlerFailure;
use crate::invoker::{execute, Mode, Outcome};
use crate::naming::{action_file_name, controller_folder_name};
use crate::registry::{ActionEntry, Controller, Registry};
use crate::request::{RequestContext, SynthesizedRequest};
use crate::resolver::Resolver;
use crate::response::NormalizedResponse;
use crate::scanner::{ControllerFilter, Discovery};
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// What happened to one action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Strict mode: the action document at `path` was updated
    Documented {
        controller: String,
        action: String,
        path: PathBuf,
        status: u16,
    },
    /// Lenient mode: the handler ran, nothing was written
    Explored {
        controller: String,
        action: String,
        status: u16,
        content: String,
    },
    /// Lenient mode: the handler failed
    Skipped {
        controller: String,
        action: String,
        failure: HandlerFailure,
    },
}

/// Outcomes of a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl RunReport {
    pub fn documented(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Documented { .. }))
    }

    pub fn explored(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Explored { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Skipped { .. }))
    }

    fn count(&self, predicate: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

pub struct Engine<'a> {
    registry: &'a Registry,
    container: &'a Container,
    store: DocumentStore,
    server: Map<String, Value>,
    mode: Mode,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry, container: &'a Container, store: DocumentStore) -> Self {
        Self {
            registry,
            container,
            store,
            server: Map::new(),
            mode: Mode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Base server environment copied into every synthesized request.
    pub fn with_server(mut self, server: Map<String, Value>) -> Self {
        self.server = server;
        self
    }

    /// Processes every discovered controller that passes `filter`.
    ///
    /// # Arguments
    ///
    /// * `discovery` - Source of controller identifiers, such as the registry or a
    ///   [`DirectoryScanner`](crate::scanner::DirectoryScanner)
    /// * `filter` - Which discovered controllers to process
    ///
    /// # Returns
    ///
    /// A [`RunReport`] with one outcome per processed action, in discovery order.
    /// Identifiers without a registered controller are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error: a missing url, method or parameter value, an
    /// unresolvable parameter, a handler failure in strict mode, an unreadable group
    /// document, or an unknown `Only` controller.
    pub fn run(&self, discovery: &dyn Discovery, filter: &ControllerFilter) -> Result<RunReport> {
        let identifiers = filter.apply(discovery.discover()?)?;
        info!("Processing {} controller(s) in {:?} mode", identifiers.len(), self.mode);

        let mut report = RunReport::default();
        for identifier in identifiers {
            match self.registry.get(&identifier) {
                Some(controller) => report.outcomes.extend(self.process_controller(controller)?),
                None => debug!("{} is not a documented controller, skipping", identifier),
            }
        }
        Ok(report)
    }

    pub fn process_controller(&self, controller: &Controller) -> Result<Vec<ActionOutcome>> {
        debug!("Processing controller {}", controller.name());
        let mut outcomes = Vec::new();
        for entry in controller.actions() {
            if let Some(outcome) = self.process_action(controller, entry)? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Runs one action; `None` when it carries no descriptor.
    pub fn process_action(&self, controller: &Controller, entry: &ActionEntry) -> Result<Option<ActionOutcome>> {
        let descriptor = match &entry.descriptor {
            Some(descriptor) => descriptor,
            None => {
                debug!("{}::{} has no descriptor, skipping", controller.name(), entry.name);
                return Ok(None);
            }
        };
        let action = format!("{}::{}", controller.name(), entry.name);

        let url = required(descriptor.get_url()).ok_or_else(|| Error::MissingRequiredField {
            field: "URL",
            action: action.clone(),
            location: entry.location.clone(),
            example: ".url(\"/admin/resource\") or .config(\"url\", \"/admin/resource\")".to_string(),
        })?;
        let method = required(descriptor.get_method()).ok_or_else(|| Error::MissingRequiredField {
            field: "METHOD",
            action: action.clone(),
            location: entry.location.clone(),
            example: ".method(\"POST\") or .config(\"method\", \"POST\")".to_string(),
        })?;

        let context = RequestContext::synthesize(&self.server, descriptor);
        let resolved = Resolver {
            descriptor,
            context: &context,
            container: self.container,
            action: &action,
            location: &entry.location,
        }
        .resolve(&entry.handler.parameter_specs())?;

        let response = match execute(self.mode, entry.handler.as_ref(), &resolved, &action)? {
            Outcome::Response(response) => response,
            Outcome::Skipped(failure) => {
                return Ok(Some(ActionOutcome::Skipped {
                    controller: controller.name().to_string(),
                    action: entry.name.clone(),
                    failure,
                }))
            }
        };

        if self.mode == Mode::Lenient {
            return Ok(Some(ActionOutcome::Explored {
                controller: controller.name().to_string(),
                action: entry.name.clone(),
                status: response.status,
                content: response.content,
            }));
        }

        let path = self.persist(controller, entry, descriptor, &url, &method, &resolved.request, &response)?;
        Ok(Some(ActionOutcome::Documented {
            controller: controller.name().to_string(),
            action: entry.name.clone(),
            path,
            status: response.status,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn persist(
        &self,
        controller: &Controller,
        entry: &ActionEntry,
        descriptor: &ActionDescriptor,
        url: &str,
        method: &str,
        request: &SynthesizedRequest,
        response: &NormalizedResponse,
    ) -> Result<PathBuf> {
        let file_name = action_file_name(&entry.name);
        let folder_name = controller_folder_name(controller.name());
        let group_path = self.store.group_document_path(descriptor.get_group().as_deref());
        let action_path = self.store.action_document_path(&folder_name, &file_name);

        self.store.register_path(&group_path, url, &folder_name, &file_name)?;
        self.store
            .write_action(&action_path, method, descriptor, Some(request), response)?;
        Ok(action_path)
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler, ParamSpec, Reply};
    use crate::openapi_builder::Info;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> DocumentStore {
        DocumentStore::new(temp_dir.path().join("swagger"), "root", Info::default())
    }

    fn widget_registry() -> Registry {
        Registry::new().register(
            Controller::new("App::Http::Controllers::WidgetController")
                .action(
                    "show",
                    ActionDescriptor::new()
                        .url("/widgets/{id}")
                        .method("GET")
                        .url_param("id", "42"),
                    handler(vec![ParamSpec::builtin("id", "i64")], |args, _| {
                        Ok(Reply::Value(json!({"id": 42, "name": "foo", "requested": args.value("id")})))
                    }),
                )
                .undocumented("helper", handler(vec![], |_, _| Ok(Reply::Value(json!(null))))),
        )
    }

    #[test]
    fn test_run_documents_action() {
        let temp_dir = TempDir::new().unwrap();
        let registry = widget_registry();
        let container = Container::new();
        let engine = Engine::new(&registry, &container, store(&temp_dir));

        let report = engine.run(&registry, &ControllerFilter::Default).unwrap();

        assert_eq!(report.documented(), 1);
        let path = temp_dir.path().join("swagger/widget/get_one_update_delete.json");
        assert_eq!(
            report.outcomes[0],
            ActionOutcome::Documented {
                controller: "App::Http::Controllers::WidgetController".to_string(),
                action: "show".to_string(),
                path: path.clone(),
                status: 200,
            }
        );
        let document: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(document["get"]["parameters"][0]["schema"], json!({"type": "integer", "example": "42"}));
    }

    #[test]
    fn test_missing_method_is_fatal_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::new().register(Controller::new("App::WidgetController").action(
            "index",
            ActionDescriptor::new().url("/widgets"),
            handler(vec![], |_, _| Ok(Reply::Value(json!([])))),
        ));
        let container = Container::new();
        let engine = Engine::new(&registry, &container, store(&temp_dir));

        let err = engine.run(&registry, &ControllerFilter::Default).unwrap_err();

        match err {
            Error::MissingRequiredField { field, action, .. } => {
                assert_eq!(field, "METHOD");
                assert_eq!(action, "App::WidgetController::index");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!temp_dir.path().join("swagger").exists());
    }

    #[test]
    fn test_empty_config_url_counts_as_missing() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::new().register(Controller::new("App::WidgetController").action(
            "index",
            ActionDescriptor::new().url("/widgets").method("GET").config("url", ""),
            handler(vec![], |_, _| Ok(Reply::Value(json!([])))),
        ));
        let container = Container::new();
        let engine = Engine::new(&registry, &container, store(&temp_dir));

        let err = engine.run(&registry, &ControllerFilter::Default).unwrap_err();
        assert!(err.to_string().contains("Http URL is required"));
    }

    #[test]
    fn test_lenient_mode_explores_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let registry = widget_registry();
        let container = Container::new();
        let engine = Engine::new(&registry, &container, store(&temp_dir)).with_mode(Mode::Lenient);

        let report = engine.run(&registry, &ControllerFilter::Default).unwrap();

        assert_eq!(report.explored(), 1);
        assert!(!temp_dir.path().join("swagger").exists());
    }

    #[test]
    fn test_base_server_reaches_handler() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::new().register(Controller::new("App::PingController").action(
            "ping",
            ActionDescriptor::new().url("/ping").method("GET"),
            handler(vec![], |_, request| {
                Ok(Reply::Value(request.server.get("SERVER_NAME").cloned().unwrap_or_default()))
            }),
        ));
        let container = Container::new();
        let mut server = Map::new();
        server.insert("SERVER_NAME".to_string(), json!("docs.local"));
        let engine = Engine::new(&registry, &container, store(&temp_dir))
            .with_mode(Mode::Lenient)
            .with_server(server);

        let report = engine.run(&registry, &ControllerFilter::Default).unwrap();
        match &report.outcomes[0] {
            ActionOutcome::Explored { content, .. } => assert_eq!(content, "docs.local"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
