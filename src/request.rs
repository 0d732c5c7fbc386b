//! Synthesized request context.
//!
//! Handlers are never called with a real inbound request. Instead the engine assembles
//! a [`SynthesizedRequest`] from descriptor data: a server environment holding the
//! request method and `HTTP_*` header entries, the declared query parameters, and
//! whatever partials a complex parameter asked for.

use crate::descriptor::ActionDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};

/// Server key holding the HTTP method
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";

/// Per-action server environment.
///
/// Built fresh for every action from a base environment, so headers declared on one
/// action never leak into the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    server: Map<String, Value>,
}

impl RequestContext {
    /// Builds the server map for `descriptor`: `base`, then `REQUEST_METHOD`, then one
    /// `HTTP_<NAME>` entry per declared header.
    pub fn synthesize(base: &Map<String, Value>, descriptor: &ActionDescriptor) -> Self {
        let mut server = base.clone();
        let method = descriptor.get_method().unwrap_or_else(|| "GET".to_string());
        server.insert(REQUEST_METHOD.to_string(), Value::String(method));
        project_headers(&mut server, descriptor.get_headers());
        Self { server }
    }

    pub fn server(&self) -> &Map<String, Value> {
        &self.server
    }
}

/// Copies headers into a server map as upper-cased `HTTP_<NAME>` entries.
pub fn project_headers(server: &mut Map<String, Value>, headers: &Map<String, Value>) {
    for (name, value) in headers {
        server.insert(format!("HTTP_{}", name.to_uppercase()), value.clone());
    }
}

/// In-memory stand-in for an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynthesizedRequest {
    pub query: Map<String, Value>,
    /// Body parameters
    pub request: Map<String, Value>,
    pub attributes: Map<String, Value>,
    pub cookies: Map<String, Value>,
    pub files: Map<String, Value>,
    pub server: Map<String, Value>,
    pub content: Option<String>,
}

impl SynthesizedRequest {
    /// Builds a request from partials keyed by partial name.
    pub fn from_partials(partials: &Map<String, Value>) -> Result<Self, String> {
        let mut request = Self::default();
        for (key, value) in partials {
            request.merge_partial(key, value)?;
        }
        Ok(request)
    }

    /// Merges one partial into the request.
    ///
    /// Map partials are merged key by key: existing keys keep their position and take
    /// the new value, new keys are appended. `content` is replaced.
    pub fn merge_partial(&mut self, key: &str, value: &Value) -> Result<(), String> {
        if key == "content" {
            self.content = match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            return Ok(());
        }

        let target = match key {
            "query" => &mut self.query,
            "request" => &mut self.request,
            "attributes" => &mut self.attributes,
            "cookies" => &mut self.cookies,
            "files" => &mut self.files,
            "server" => &mut self.server,
            other => return Err(format!("unknown request partial \"{}\"", other)),
        };

        match value {
            Value::Object(entries) => {
                for (k, v) in entries {
                    target.insert(k.clone(), v.clone());
                }
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(format!(
                "request partial \"{}\" must be an object, got {}",
                key, other
            )),
        }
    }

    /// HTTP method from the server map, `GET` when absent.
    pub fn method(&self) -> &str {
        self.server
            .get(REQUEST_METHOD)
            .and_then(Value::as_str)
            .unwrap_or("GET")
    }

    /// Header lookup over the server map; names compare case-insensitively and treat
    /// `_` and `-` as equal.
    pub fn header(&self, name: &str) -> Option<&Value> {
        let wanted = normalize_header_name(name);
        self.server.iter().find_map(|(key, value)| {
            let header = if let Some(rest) = key.strip_prefix("HTTP_") {
                rest
            } else if matches!(key.as_str(), "CONTENT_TYPE" | "CONTENT_LENGTH" | "CONTENT_MD5") {
                key.as_str()
            } else {
                return None;
            };
            (normalize_header_name(header) == wanted).then_some(value)
        })
    }

    /// Merged query and body input, body winning on conflicts.
    pub fn input(&self) -> Map<String, Value> {
        let mut input = self.query.clone();
        for (k, v) in &self.request {
            input.insert(k.clone(), v.clone());
        }
        input
    }
}

fn normalize_header_name(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_context_projects_headers_and_method() {
        let descriptor = ActionDescriptor::new()
            .method("POST")
            .header("Authorization", "Bearer abc")
            .header("x-tenant", 7);
        let base = object(json!({"SERVER_NAME": "localhost"}));

        let context = RequestContext::synthesize(&base, &descriptor);
        let server = context.server();

        assert_eq!(server["SERVER_NAME"], json!("localhost"));
        assert_eq!(server[REQUEST_METHOD], json!("POST"));
        assert_eq!(server["HTTP_AUTHORIZATION"], json!("Bearer abc"));
        assert_eq!(server["HTTP_X-TENANT"], json!(7));
    }

    #[test]
    fn test_context_is_fresh_per_action() {
        let base = Map::new();
        let first = ActionDescriptor::new().header("X-One", "1");
        let second = ActionDescriptor::new();

        RequestContext::synthesize(&base, &first);
        let context = RequestContext::synthesize(&base, &second);

        assert!(!context.server().contains_key("HTTP_X-ONE"));
        assert_eq!(context.server()[REQUEST_METHOD], json!("GET"));
    }

    #[test]
    fn test_merge_partial_keeps_position_and_overwrites() {
        let mut request = SynthesizedRequest::default();
        request
            .merge_partial("query", &json!({"page": 1, "sort": "asc"}))
            .unwrap();
        request
            .merge_partial("query", &json!({"page": 2, "limit": 10}))
            .unwrap();

        let keys: Vec<_> = request.query.keys().cloned().collect();
        assert_eq!(keys, vec!["page", "sort", "limit"]);
        assert_eq!(request.query["page"], json!(2));
    }

    #[test]
    fn test_merge_partial_rejects_unknown_key_and_bad_shape() {
        let mut request = SynthesizedRequest::default();

        assert!(request.merge_partial("body", &json!({})).is_err());
        assert!(request.merge_partial("query", &json!("page=1")).is_err());
        assert!(request.merge_partial("query", &Value::Null).is_ok());
    }

    #[test]
    fn test_from_partials_sets_content() {
        let request = SynthesizedRequest::from_partials(&object(json!({
            "request": {"name": "foo"},
            "content": "{\"name\":\"foo\"}"
        })))
        .unwrap();

        assert_eq!(request.request["name"], json!("foo"));
        assert_eq!(request.content.as_deref(), Some("{\"name\":\"foo\"}"));
    }

    #[test]
    fn test_header_lookup_is_normalized() {
        let mut request = SynthesizedRequest::default();
        request.server = object(json!({
            "HTTP_CONTENT-TYPE": "application/xml",
            "HTTP_X_API_KEY": "k",
            "REQUEST_METHOD": "PUT"
        }));

        assert_eq!(request.header("Content-Type"), Some(&json!("application/xml")));
        assert_eq!(request.header("CONTENT_TYPE"), Some(&json!("application/xml")));
        assert_eq!(request.header("x-api-key"), Some(&json!("k")));
        assert!(request.header("request-method").is_none());
        assert_eq!(request.method(), "PUT");
    }

    #[test]
    fn test_input_prefers_body_values() {
        let request = SynthesizedRequest {
            query: object(json!({"page": 1, "name": "q"})),
            request: object(json!({"name": "body"})),
            ..Default::default()
        };

        let input = request.input();
        assert_eq!(input["page"], json!(1));
        assert_eq!(input["name"], json!("body"));
    }
}
