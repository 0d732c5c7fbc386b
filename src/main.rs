//! OpenAPI from invocation - command-line tool.
//!
//! Runs every documented action of the registered controllers and writes the
//! resulting group and action documents.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-invocation [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Write documents to `public/swagger`:
//! ```bash
//! openapi-from-invocation --folder public/swagger
//! ```
//!
//! Explore a single controller without writing anything:
//! ```bash
//! openapi-from-invocation --debug --class WidgetController -v
//! ```
//!
//! The binary ships with a small sample controller; applications embed the library
//! and pass their own registry to `cli::run`.

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_invocation::cli;
use openapi_from_invocation::container::Container;
use openapi_from_invocation::descriptor::ActionDescriptor;
use openapi_from_invocation::handler::{
    handler, FormRequest, HandlerFailure, ParamSpec, Rejection, Reply, ValidationErrors,
};
use openapi_from_invocation::registry::{Controller, Registry};
use openapi_from_invocation::request::SynthesizedRequest;
use serde_json::{json, Map, Value};

fn main() -> Result<()> {
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from invocation starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    let registry = sample_registry();
    let container = Container::new();
    cli::run(args, &registry, &container)?;

    info!("Documentation run completed successfully");

    Ok(())
}

/// Validates the body of a widget creation request.
struct StoreWidgetRequest;

impl FormRequest for StoreWidgetRequest {
    fn type_name(&self) -> &str {
        "StoreWidgetRequest"
    }

    fn validate(&self, request: &SynthesizedRequest) -> std::result::Result<Map<String, Value>, Rejection> {
        let mut validated = Map::new();
        match request.request.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => {
                validated.insert("name".to_string(), json!(name));
            }
            _ => {
                return Err(Rejection::Invalid(
                    ValidationErrors::new().with("name", "The name field is required."),
                ))
            }
        }
        if let Some(price) = request.request.get("price") {
            validated.insert("price".to_string(), price.clone());
        }
        Ok(validated)
    }
}

fn sample_registry() -> Registry {
    Registry::new().register(
        Controller::new("App::Http::Controllers::WidgetController")
            .action(
                "index",
                ActionDescriptor::new()
                    .url("/widgets")
                    .method("GET")
                    .query_param("page", "1"),
                handler(vec![], |_, request| {
                    let page = request.query.get("page").cloned().unwrap_or(json!("1"));
                    Ok(Reply::Value(json!({
                        "data": [{"id": 42, "name": "foo", "price": 9.5}],
                        "meta": {"page": page, "total": 1}
                    })))
                }),
            )
            .action(
                "show",
                ActionDescriptor::new()
                    .url("/widgets/{id}")
                    .method("GET")
                    .url_param("id", "42"),
                handler(vec![ParamSpec::builtin("id", "i64")], |args, _| {
                    match args.value("id").and_then(Value::as_str) {
                        Some("42") => Ok(Reply::Value(json!({"id": 42, "name": "foo"}))),
                        _ => Err(HandlerFailure::new("widget not found")),
                    }
                }),
            )
            .action(
                "store",
                ActionDescriptor::new()
                    .url("/widgets")
                    .method("POST")
                    .header("Authorization", "Bearer sample-token")
                    .typed_parameter(
                        "request",
                        json!({"request": {"name": "foo", "price": 9.5}}),
                    ),
                handler(
                    vec![ParamSpec::validated("request", StoreWidgetRequest)],
                    |args, _| {
                        let input = args
                            .validated("request")
                            .ok_or_else(|| HandlerFailure::new("missing validated input"))?;
                        let mut widget = input.validated.clone();
                        widget.insert("id".to_string(), json!(43));
                        Ok(Reply::Value(Value::Object(widget)))
                    },
                ),
            ),
    )
}
