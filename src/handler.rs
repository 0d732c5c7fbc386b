//! Capability interface implemented by documented handlers.
//!
//! A handler declares its parameters as [`ParamSpec`]s and is called with resolved
//! [`Arguments`]. Whatever it returns is a [`Reply`], which the invoker coerces into a
//! [`NormalizedResponse`].

use crate::request::SynthesizedRequest;
use crate::response::NormalizedResponse;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// `file:line` of a registration or failure site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Error returned by a failing handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub message: String,
    pub location: SourceLocation,
}

impl HandlerFailure {
    /// Records the message together with the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message, SourceLocation::caller())
    }

    pub fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.message, self.location)
    }
}

impl std::error::Error for HandlerFailure {}

/// Per-field validation messages, in the order fields were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.fields.push((field, vec![message.into()])),
        }
    }

    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message of the first field.
    pub fn first(&self) -> Option<&str> {
        self.fields
            .first()
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(field, messages)| {
                let messages = messages.iter().cloned().map(Value::String).collect();
                (field.clone(), Value::Array(messages))
            })
            .collect()
    }

    /// The 422 response a validation failure is converted into.
    pub fn into_response(self) -> NormalizedResponse {
        NormalizedResponse::unprocessable(self.first().unwrap_or_default(), self.to_map())
    }
}

/// Why a validated parameter refused its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Field-level validation failure, recovered as a 422 response
    Invalid(ValidationErrors),
    /// Ready-made response to use as-is
    Respond(NormalizedResponse),
    /// Anything else; fatal for the run
    Failed(String),
}

/// A complex parameter type that validates itself when resolved.
pub trait FormRequest {
    /// Type name used in diagnostics
    fn type_name(&self) -> &str;

    /// Validates the synthesized request and returns the validated data.
    fn validate(&self, request: &SynthesizedRequest) -> Result<Map<String, Value>, Rejection>;
}

/// How a handler parameter is resolved.
#[derive(Clone)]
pub enum ParamKind {
    /// Built-in value taken verbatim from the descriptor's url params. Carries the
    /// declared type name when there is one; it is informational only.
    Builtin(Option<String>),
    /// Request synthesized from typed-parameter data, then validated
    Validated(Arc<dyn FormRequest>),
    /// Request synthesized from typed-parameter data, not validated
    Request,
    /// Any other type, built by the service container
    Service(String),
}

impl fmt::Debug for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Builtin(ty) => f.debug_tuple("Builtin").field(ty).finish(),
            ParamKind::Validated(form) => f.debug_tuple("Validated").field(&form.type_name()).finish(),
            ParamKind::Request => f.write_str("Request"),
            ParamKind::Service(ty) => f.debug_tuple("Service").field(ty).finish(),
        }
    }
}

/// One declared handler parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn builtin(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Builtin(Some(type_name.into())),
        }
    }

    /// Parameter without a declared type; resolved like a built-in.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Builtin(None),
        }
    }

    pub fn validated(name: impl Into<String>, form: impl FormRequest + 'static) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Validated(Arc::new(form)),
        }
    }

    pub fn request(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Request,
        }
    }

    pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Service(type_name.into()),
        }
    }
}

/// Request handed to a validated parameter, with the data it accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInput {
    pub request: SynthesizedRequest,
    /// Empty when validation was rejected
    pub validated: Map<String, Value>,
}

/// A resolved parameter value.
pub enum Argument {
    Value(Value),
    Request(SynthesizedRequest),
    Validated(ValidatedInput),
    Service(Box<dyn Any>),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Argument::Request(r) => f.debug_tuple("Request").field(r).finish(),
            Argument::Validated(v) => f.debug_tuple("Validated").field(v).finish(),
            Argument::Service(_) => f.write_str("Service(..)"),
        }
    }
}

/// Resolved arguments in declaration order.
#[derive(Debug, Default)]
pub struct Arguments {
    entries: Vec<(String, Argument)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, argument: Argument) {
        self.entries.push((name.into(), argument));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, argument)| argument)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            Argument::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn request(&self, name: &str) -> Option<&SynthesizedRequest> {
        match self.get(name)? {
            Argument::Request(r) => Some(r),
            Argument::Validated(v) => Some(&v.request),
            _ => None,
        }
    }

    pub fn validated(&self, name: &str) -> Option<&ValidatedInput> {
        match self.get(name)? {
            Argument::Validated(v) => Some(v),
            _ => None,
        }
    }

    pub fn service<T: 'static>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            Argument::Service(instance) => instance.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }
}

/// A value that knows how to render itself as a response.
pub trait Responsable {
    fn to_response(&self, request: &SynthesizedRequest) -> NormalizedResponse;
}

/// Raw return value of a handler.
pub enum Reply {
    /// Structured, array or scalar data
    Value(Value),
    /// Collection-like data, always a JSON body
    Collection(Vec<Value>),
    Responsable(Box<dyn Responsable>),
    /// Full response, passed through unchanged
    Response(NormalizedResponse),
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<NormalizedResponse> for Reply {
    fn from(response: NormalizedResponse) -> Self {
        Reply::Response(response)
    }
}

/// A documented handler.
pub trait Invocable {
    fn parameter_specs(&self) -> Vec<ParamSpec>;

    fn invoke(&self, args: &Arguments, request: &SynthesizedRequest) -> Result<Reply, HandlerFailure>;
}

/// [`Invocable`] backed by a closure.
pub struct FnHandler<F> {
    params: Vec<ParamSpec>,
    f: F,
}

/// Wraps a closure and its parameter list as a handler.
pub fn handler<F>(params: Vec<ParamSpec>, f: F) -> FnHandler<F>
where
    F: Fn(&Arguments, &SynthesizedRequest) -> Result<Reply, HandlerFailure>,
{
    FnHandler { params, f }
}

impl<F> Invocable for FnHandler<F>
where
    F: Fn(&Arguments, &SynthesizedRequest) -> Result<Reply, HandlerFailure>,
{
    fn parameter_specs(&self) -> Vec<ParamSpec> {
        self.params.clone()
    }

    fn invoke(&self, args: &Arguments, request: &SynthesizedRequest) -> Result<Reply, HandlerFailure> {
        (self.f)(args, request)
    }
}
