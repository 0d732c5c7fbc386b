//! Uniform response shape produced from whatever a handler returns.

use serde_json::{json, Map, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status, content type and serialized body of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub status: u16,
    /// `None` when the response never declared one; documented as JSON
    pub content_type: Option<String>,
    pub content: String,
}

impl Default for NormalizedResponse {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: None,
            content: String::new(),
        }
    }
}

impl NormalizedResponse {
    pub fn new(status: u16, content_type: Option<String>, content: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            content: content.into(),
        }
    }

    /// JSON body at status 200.
    pub fn json(data: &Value) -> Self {
        Self::json_with_status(data, 200)
    }

    pub fn json_with_status(data: &Value, status: u16) -> Self {
        Self {
            status,
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            content: data.to_string(),
        }
    }

    /// Plain body at status 200; scalars are stringified, `true` as `1`, `false` and
    /// `null` as the empty string.
    pub fn plain(data: &Value) -> Self {
        let content = match data {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) | Value::Null => String::new(),
            other => other.to_string(),
        };
        Self {
            content,
            ..Self::default()
        }
    }

    /// 422 response carrying the first message and every message by field.
    pub fn unprocessable(message: &str, errors: Map<String, Value>) -> Self {
        Self::json_with_status(&json!({ "message": message, "errors": errors }), 422)
    }

    /// Decoded body; `null` when the content is not JSON.
    pub fn body(&self) -> Value {
        serde_json::from_str(&self.content).unwrap_or(Value::Null)
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE)
    }

    pub fn status_text(&self) -> &'static str {
        status_text(self.status)
    }
}

/// Standard reason phrase for a status code.
pub fn status_text(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Content",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => "unknown status",
    }
}
