//! OpenAPI from invocation - API documentation synthesized by running handlers.
//!
//! Each documented action carries an [`descriptor::ActionDescriptor`] naming its url,
//! method and sample inputs. The engine fabricates a request from the descriptor,
//! invokes the handler, infers JSON-Schema fragments from the sample inputs and the
//! response body, and merges them into a tree of JSON documents:
//!
//! - one group document per group (`swagger/root.json`), mapping endpoint paths to
//!   action documents through `$ref` pointers;
//! - one action document per resource (`swagger/widget/get_one_update_delete.json`),
//!   keyed by HTTP method, each method keyed by status code.
//!
//! Re-running is idempotent, and merging never drops methods or status codes recorded
//! by earlier runs.
//!
//! # Architecture
//!
//! 1. [`registry`] - controllers and their actions, registered at startup
//! 2. [`scanner`] - discovery of controller names and the controller filter
//! 3. [`request`] - per-action server environment and synthesized requests
//! 4. [`resolver`] - maps declared handler parameters to values
//! 5. [`invoker`] - runs the handler and normalizes whatever it returns
//! 6. [`schema_generator`] - schema inference from sample values
//! 7. [`openapi_builder`] - operation fragments and the group template
//! 8. [`document_store`] - read-merge-write of persisted documents
//! 9. [`engine`] - drives all of the above for every action
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_invocation::{
//!     container::Container,
//!     descriptor::ActionDescriptor,
//!     document_store::DocumentStore,
//!     engine::Engine,
//!     handler::{handler, ParamSpec, Reply},
//!     openapi_builder::Info,
//!     registry::{Controller, Registry},
//!     scanner::ControllerFilter,
//! };
//! use serde_json::json;
//!
//! let registry = Registry::new().register(
//!     Controller::new("App::Http::Controllers::WidgetController").action(
//!         "show",
//!         ActionDescriptor::new()
//!             .url("/widgets/{id}")
//!             .method("GET")
//!             .url_param("id", "42"),
//!         handler(vec![ParamSpec::builtin("id", "i64")], |_, _| {
//!             Ok(Reply::Value(json!({"id": 42, "name": "foo"})))
//!         }),
//!     ),
//! );
//! let container = Container::new();
//! let store = DocumentStore::new("swagger", "root", Info::default());
//!
//! let report = Engine::new(&registry, &container, store)
//!     .run(&registry, &ControllerFilter::Default)
//!     .unwrap();
//! println!("Documented {} action(s)", report.documented());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod container;
pub mod descriptor;
pub mod document_store;
pub mod engine;
pub mod error;
pub mod handler;
pub mod invoker;
pub mod naming;
pub mod openapi_builder;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod response;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
