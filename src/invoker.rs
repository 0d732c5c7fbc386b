//! Handler invocation and response normalization.

use crate::error::{Error, Result};
use crate::handler::{HandlerFailure, Invocable, Reply};
use crate::request::SynthesizedRequest;
use crate::resolver::ResolvedParameters;
use crate::response::NormalizedResponse;
use log::{debug, error, info};
use serde_json::Value;

/// How handler failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Short-circuit responses are used without invoking; handler failures abort the run
    #[default]
    Strict,
    /// Always invoke; handler failures skip the action
    Lenient,
}

/// Result of running one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Response(NormalizedResponse),
    /// Handler failed in lenient mode
    Skipped(HandlerFailure),
}

/// Coerces a handler's reply into a response.
pub fn normalize(reply: Reply, request: &SynthesizedRequest) -> NormalizedResponse {
    match reply {
        Reply::Value(value @ (Value::Object(_) | Value::Array(_))) => NormalizedResponse::json(&value),
        Reply::Value(scalar) => NormalizedResponse::plain(&scalar),
        Reply::Collection(items) => NormalizedResponse::json(&Value::Array(items)),
        Reply::Responsable(responsable) => responsable.to_response(request),
        Reply::Response(response) => response,
    }
}

/// Runs `handler` with the resolved parameters according to `mode`.
pub fn execute(
    mode: Mode,
    handler: &dyn Invocable,
    resolved: &ResolvedParameters,
    action: &str,
) -> Result<Outcome> {
    match mode {
        Mode::Strict => {
            if let Some(response) = &resolved.short_circuit {
                debug!(
                    "Using status {} captured while resolving {}() without invoking it",
                    response.status, action
                );
                return Ok(Outcome::Response(response.clone()));
            }

            let reply = handler
                .invoke(&resolved.arguments, &resolved.request)
                .map_err(|failure| Error::Invocation {
                    action: action.to_string(),
                    failure,
                })?;
            Ok(Outcome::Response(normalize(reply, &resolved.request)))
        }
        Mode::Lenient => {
            info!("{}()", action);
            match handler.invoke(&resolved.arguments, &resolved.request) {
                Ok(reply) => {
                    let response = normalize(reply, &resolved.request);
                    info!("Ok: {}", response.content);
                    Ok(Outcome::Response(response))
                }
                Err(failure) => {
                    error!("Error: {}", failure.message);
                    error!("Location: {}", failure.location);
                    Ok(Outcome::Skipped(failure))
                }
            }
        }
    }
}
