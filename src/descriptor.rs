//! Declarative per-action configuration.
//!
//! An [`ActionDescriptor`] tells the engine how to call one handler: which URL and HTTP
//! method it answers, which values to pass for its primitive parameters, which query
//! parameters and headers to put on the synthesized request, and which request data
//! to use for each complex parameter.
//!
//! Every field can also be overridden through the generic `config` bag. Accessors
//! check `config` first and fall back to the field, so `config` always wins.
//!
//! ```
//! use openapi_from_invocation::descriptor::ActionDescriptor;
//!
//! let descriptor = ActionDescriptor::new()
//!     .url("/widgets/{id}")
//!     .method("GET")
//!     .config("method", "POST");
//!
//! assert_eq!(descriptor.get_method().as_deref(), Some("POST"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `config` key overriding [`ActionDescriptor::url`]
pub const CONFIG_URL: &str = "url";
/// `config` key overriding [`ActionDescriptor::method`]
pub const CONFIG_METHOD: &str = "method";
/// `config` key overriding [`ActionDescriptor::group`]
pub const CONFIG_GROUP: &str = "group";
/// `config` key overriding [`ActionDescriptor::url_params`]
pub const CONFIG_URL_PARAMS: &str = "url_params";
/// `config` key overriding [`ActionDescriptor::query_params`]
pub const CONFIG_QUERY_PARAMS: &str = "query_params";
/// `config` key overriding [`ActionDescriptor::headers`]
pub const CONFIG_HEADERS: &str = "headers";

/// Declared metadata for one documented action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDescriptor {
    /// Endpoint path, e.g. `/widgets/{id}`
    pub url: Option<String>,
    /// HTTP method, e.g. `GET`
    pub method: Option<String>,
    /// Group document the endpoint is registered into
    pub group: Option<String>,
    /// Values for the handler's primitive parameters, also documented as path parameters
    pub url_params: Map<String, Value>,
    /// Query string values for the synthesized request
    pub query_params: Map<String, Value>,
    /// Header values for the synthesized request
    pub headers: Map<String, Value>,
    /// Generic override bag, checked before every field above
    pub config: Map<String, Value>,
    /// Request partials (`query`, `request`, `server`, ...) per complex parameter name
    pub typed_parameters: Map<String, Value>,
}

impl ActionDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn url_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url_params.insert(name.into(), value.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Registers request partials for the complex parameter `name`.
    ///
    /// `data` is an object keyed by partial name, e.g.
    /// `{"request": {"name": "foo"}, "query": {"page": 1}}`.
    pub fn typed_parameter(mut self, name: impl Into<String>, data: Value) -> Self {
        self.typed_parameters.insert(name.into(), data);
        self
    }

    pub fn get_url(&self) -> Option<String> {
        self.config_string(CONFIG_URL).or_else(|| self.url.clone())
    }

    pub fn get_method(&self) -> Option<String> {
        self.config_string(CONFIG_METHOD)
            .or_else(|| self.method.clone())
    }

    pub fn get_group(&self) -> Option<String> {
        self.config_string(CONFIG_GROUP)
            .or_else(|| self.group.clone())
    }

    pub fn get_url_params(&self) -> &Map<String, Value> {
        self.config_map(CONFIG_URL_PARAMS).unwrap_or(&self.url_params)
    }

    pub fn get_query_params(&self) -> &Map<String, Value> {
        self.config_map(CONFIG_QUERY_PARAMS)
            .unwrap_or(&self.query_params)
    }

    pub fn get_headers(&self) -> &Map<String, Value> {
        self.config_map(CONFIG_HEADERS).unwrap_or(&self.headers)
    }

    /// Looks up one url parameter, treating `null` as absent.
    pub fn url_parameter(&self, key: &str) -> Option<&Value> {
        present(self.get_url_params().get(key))
    }

    pub fn get_url_parameter(&self, key: &str, default: Value) -> Value {
        self.url_parameter(key).cloned().unwrap_or(default)
    }

    /// Looks up one query parameter, treating `null` as absent.
    pub fn query_parameter(&self, key: &str) -> Option<&Value> {
        present(self.get_query_params().get(key))
    }

    pub fn get_query_parameter(&self, key: &str, default: Value) -> Value {
        self.query_parameter(key).cloned().unwrap_or(default)
    }

    /// Request partials registered for the complex parameter `name`; empty when none
    /// were registered or the registered value is not an object.
    pub fn get_typed_parameter(&self, name: &str) -> Map<String, Value> {
        match self.typed_parameters.get(name) {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        }
    }

    fn config_item(&self, key: &str) -> Option<&Value> {
        present(self.config.get(key))
    }

    fn config_string(&self, key: &str) -> Option<String> {
        self.config_item(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn config_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.config_item(key).and_then(Value::as_object)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
