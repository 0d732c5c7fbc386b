//! Maps a handler's declared parameters to concrete values.
//!
//! Built-in parameters take their value verbatim from the descriptor's url params.
//! Request and validated parameters get a [`SynthesizedRequest`] built from their
//! typed-parameter data, the action's server environment and its declared query
//! parameters. Any other type comes from the [`Container`].
//!
//! A validation failure or a ready-made response raised while resolving is not an
//! error: it is kept as [`ResolvedParameters::short_circuit`].

use crate::container::Container;
use crate::descriptor::ActionDescriptor;
use crate::error::{Error, Result};
use crate::handler::{
    Argument, Arguments, FormRequest, ParamKind, ParamSpec, Rejection, SourceLocation, ValidatedInput,
};
use crate::request::{RequestContext, SynthesizedRequest};
use crate::response::NormalizedResponse;
use log::debug;
use serde_json::{Map, Value};

/// Outcome of resolving every parameter of one action.
#[derive(Debug)]
pub struct ResolvedParameters {
    pub arguments: Arguments,
    /// Request the action runs against; the accumulated partials of its request
    /// parameters, or the server environment and query parameters when it has none
    pub request: SynthesizedRequest,
    /// Response captured during resolution; the last one wins
    pub short_circuit: Option<NormalizedResponse>,
}

/// Resolves parameters for one action.
pub struct Resolver<'a> {
    pub descriptor: &'a ActionDescriptor,
    pub context: &'a RequestContext,
    pub container: &'a Container,
    /// Qualified action name, `Controller::action`
    pub action: &'a str,
    pub location: &'a SourceLocation,
}

impl<'a> Resolver<'a> {
    pub fn resolve(&self, specs: &[ParamSpec]) -> Result<ResolvedParameters> {
        let mut arguments = Arguments::new();
        let mut accumulated = SynthesizedRequest::default();
        let mut has_request = false;
        let mut short_circuit = None;

        for spec in specs {
            debug!("Resolving parameter {} of {}() as {:?}", spec.name, self.action, spec.kind);
            let argument = match &spec.kind {
                ParamKind::Builtin(type_name) => {
                    Argument::Value(self.builtin(&spec.name, type_name.as_deref())?)
                }
                ParamKind::Request => {
                    let request = self.synthesize(&spec.name, &mut accumulated)?;
                    has_request = true;
                    Argument::Request(request)
                }
                ParamKind::Validated(form) => {
                    let request = self.synthesize(&spec.name, &mut accumulated)?;
                    has_request = true;
                    let (input, response) = self.validate(form.as_ref(), request)?;
                    if response.is_some() {
                        short_circuit = response;
                    }
                    Argument::Validated(input)
                }
                ParamKind::Service(type_name) => {
                    let data = self.descriptor.get_typed_parameter(&spec.name);
                    let instance = self
                        .container
                        .make(type_name, &data)
                        .map_err(|message| self.resolution(message))?;
                    Argument::Service(instance)
                }
            };
            arguments.push(spec.name.clone(), argument);
        }

        if !has_request {
            accumulated.server = self.context.server().clone();
            accumulated.query = self.descriptor.get_query_params().clone();
        }

        Ok(ResolvedParameters {
            arguments,
            request: accumulated,
            short_circuit,
        })
    }

    fn builtin(&self, name: &str, type_name: Option<&str>) -> Result<Value> {
        match self.descriptor.url_parameter(name) {
            Some(value) => Ok(value.clone()),
            None => {
                let signature = match type_name {
                    Some(ty) => format!("{}: {}", name, ty),
                    None => name.to_string(),
                };
                Err(Error::MissingParameterValue {
                    parameter: name.to_string(),
                    signature,
                    action: self.action.to_string(),
                    location: self.location.clone(),
                    example: format!(
                        ".url_param(\"{0}\", value) or .config(\"url_params\", json!({{\"{0}\": value}}))",
                        name
                    ),
                })
            }
        }
    }

    /// Builds the request for a request parameter and folds its partials into
    /// `accumulated`.
    fn synthesize(&self, name: &str, accumulated: &mut SynthesizedRequest) -> Result<SynthesizedRequest> {
        let mut data = self.descriptor.get_typed_parameter(name);
        data.insert(
            "server".to_string(),
            Value::Object(self.context.server().clone()),
        );

        let mut query = match data.get("query") {
            Some(Value::Object(query)) => query.clone(),
            None | Some(Value::Null) => Map::new(),
            Some(other) => {
                return Err(self.resolution(format!(
                    "query data of parameter \"{}\" must be an object, got {}",
                    name, other
                )))
            }
        };
        for (key, value) in self.descriptor.get_query_params() {
            query.insert(key.clone(), value.clone());
        }
        data.insert("query".to_string(), Value::Object(query));

        for (key, value) in &data {
            accumulated
                .merge_partial(key, value)
                .map_err(|message| self.resolution(message))?;
        }

        SynthesizedRequest::from_partials(&data).map_err(|message| self.resolution(message))
    }

    fn validate(
        &self,
        form: &dyn FormRequest,
        request: SynthesizedRequest,
    ) -> Result<(ValidatedInput, Option<NormalizedResponse>)> {
        match form.validate(&request) {
            Ok(validated) => Ok((ValidatedInput { request, validated }, None)),
            Err(Rejection::Invalid(errors)) => {
                debug!(
                    "{} rejected input of {}(): {}",
                    form.type_name(),
                    self.action,
                    errors.first().unwrap_or_default()
                );
                let input = ValidatedInput {
                    request,
                    validated: Map::new(),
                };
                Ok((input, Some(errors.into_response())))
            }
            Err(Rejection::Respond(response)) => {
                debug!("{} responded directly with status {}", form.type_name(), response.status);
                let input = ValidatedInput {
                    request,
                    validated: Map::new(),
                };
                Ok((input, Some(response)))
            }
            Err(Rejection::Failed(message)) => Err(self.resolution(message)),
        }
    }

    fn resolution(&self, message: impl Into<String>) -> Error {
        Error::Resolution {
            action: self.action.to_string(),
            message: message.into(),
        }
    }
}
