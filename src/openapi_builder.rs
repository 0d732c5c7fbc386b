//! OpenAPI fragments built from one invocation.
//!
//! An [`Operation`] is what one (method, status) invocation contributes to an action
//! document; a [`GroupDocument`] is the index template a group file starts from.

use crate::descriptor::ActionDescriptor;
use crate::request::SynthesizedRequest;
use crate::response::{NormalizedResponse, JSON_CONTENT_TYPE};
use crate::schema_generator::{infer, Schema};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// OpenAPI version written into new group documents
pub const OPENAPI_VERSION: &str = "3.0.0";
/// Name of the bearer security scheme declared in every group document
pub const BEARER_AUTH: &str = "bearerAuth";
/// Header whose presence marks an operation as authenticated
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "API documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        }
    }
}

/// Where a parameter was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// `url_params`
    Path,
    /// `query_params`
    Url,
    /// `headers`
    Header,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Always `false`; one sample value says nothing about optionality
    pub required: bool,
    pub schema: Schema,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// Content type -> schema
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Reason phrase of the status
    pub description: String,
    pub content: BTreeMap<String, MediaType>,
}

/// Operation contributed by a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<BTreeMap<String, Vec<String>>>>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Exactly one entry, keyed by the status code
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Builds the operation fragment for one invocation.
///
/// Parameters come from the descriptor's url params, query params and headers, in
/// that order. `request` is the synthesized request of a complex parameter, if the
/// handler had one; its body partial becomes the request body.
pub fn build_operation(
    descriptor: &ActionDescriptor,
    request: Option<&SynthesizedRequest>,
    response: &NormalizedResponse,
) -> Operation {
    debug!(
        "Building operation for status {} with {} url, {} query and {} header parameter(s)",
        response.status,
        descriptor.get_url_params().len(),
        descriptor.get_query_params().len(),
        descriptor.get_headers().len()
    );

    let mut parameters = Vec::new();
    push_parameters(&mut parameters, descriptor.get_url_params(), ParameterLocation::Path);
    push_parameters(&mut parameters, descriptor.get_query_params(), ParameterLocation::Url);
    push_parameters(&mut parameters, descriptor.get_headers(), ParameterLocation::Header);

    let authenticated = descriptor
        .get_headers()
        .keys()
        .any(|name| name.eq_ignore_ascii_case(AUTHORIZATION_HEADER));
    let security = authenticated.then(|| {
        let mut requirement = BTreeMap::new();
        requirement.insert(BEARER_AUTH.to_string(), Vec::new());
        vec![requirement]
    });

    let request_body = request
        .filter(|r| !r.request.is_empty())
        .map(|r| {
            let content_type = r
                .header("content-type")
                .and_then(Value::as_str)
                .unwrap_or(JSON_CONTENT_TYPE)
                .to_string();
            RequestBody {
                content: single_content(content_type, infer(&Value::Object(r.request.clone()))),
            }
        });

    let mut responses = BTreeMap::new();
    responses.insert(
        response.status.to_string(),
        Response {
            description: response.status_text().to_string(),
            content: single_content(
                response.content_type_or_default().to_string(),
                infer(&response.body()),
            ),
        },
    );

    Operation {
        parameters,
        security,
        request_body,
        responses,
    }
}

fn push_parameters(out: &mut Vec<Parameter>, values: &Map<String, Value>, location: ParameterLocation) {
    out.extend(values.iter().map(|(name, value)| Parameter {
        name: name.clone(),
        location,
        required: false,
        schema: infer(value),
    }));
}

fn single_content(content_type: String, schema: Schema) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(content_type, MediaType { schema });
    content
}

/// Security schemes declared by every group document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
    #[serde(rename = "securitySchemes")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: String,
}

/// Group index document as first created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDocument {
    pub openapi: String,
    pub info: Info,
    /// Endpoint -> `{"$ref": "folder/file.json"}`
    pub paths: Map<String, Value>,
    pub components: Components,
}

impl GroupDocument {
    /// Empty group document carrying `info`.
    pub fn template(info: &Info) -> Self {
        let mut security_schemes = BTreeMap::new();
        security_schemes.insert(
            BEARER_AUTH.to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                scheme: "bearer".to_string(),
            },
        );
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: info.clone(),
            paths: Map::new(),
            components: Components { security_schemes },
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_operation_for_get_with_path_parameter() {
        let descriptor = ActionDescriptor::new()
            .url("/widgets/{id}")
            .method("GET")
            .url_param("id", "42");
        let response = NormalizedResponse::json(&json!({"id": 42, "name": "foo"}));

        let operation = build_operation(&descriptor, None, &response);

        assert_eq!(
            operation.to_value().unwrap(),
            json!({
                "parameters": [{
                    "name": "id",
                    "in": "path",
                    "required": false,
                    "schema": {"type": "integer", "example": "42"}
                }],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "id": {"type": "integer", "example": 42},
                                        "name": {"type": "string", "example": "foo"}
                                    }
                                }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_parameter_locations_and_security() {
        let descriptor = ActionDescriptor::new()
            .url_param("id", 1)
            .query_param("page", "2")
            .header("authorization", "Bearer token");

        let operation = build_operation(&descriptor, None, &NormalizedResponse::default());
        let locations: Vec<_> = operation.parameters.iter().map(|p| p.location).collect();

        assert_eq!(
            locations,
            vec![ParameterLocation::Path, ParameterLocation::Url, ParameterLocation::Header]
        );
        let value = operation.to_value().unwrap();
        assert_eq!(value["parameters"][1]["in"], json!("url"));
        assert_eq!(value["security"], json!([{"bearerAuth": []}]));
    }

    #[test]
    fn test_request_body_uses_request_content_type() {
        let request = SynthesizedRequest {
            request: object(json!({"name": "foo"})),
            server: object(json!({"HTTP_CONTENT-TYPE": "application/x-www-form-urlencoded"})),
            ..Default::default()
        };

        let operation = build_operation(
            &ActionDescriptor::new(),
            Some(&request),
            &NormalizedResponse::default(),
        );

        assert_eq!(
            operation.to_value().unwrap()["requestBody"],
            json!({
                "content": {
                    "application/x-www-form-urlencoded": {
                        "schema": {
                            "type": "object",
                            "properties": {"name": {"type": "string", "example": "foo"}}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_request_body_is_omitted() {
        let request = SynthesizedRequest::default();
        let operation = build_operation(
            &ActionDescriptor::new(),
            Some(&request),
            &NormalizedResponse::default(),
        );

        assert!(operation.request_body.is_none());
        assert!(operation.to_value().unwrap().get("requestBody").is_none());
    }

    #[test]
    fn test_field_order() {
        let request = SynthesizedRequest {
            request: object(json!({"a": 1})),
            ..Default::default()
        };
        let descriptor = ActionDescriptor::new().header("Authorization", "x");
        let value = build_operation(&descriptor, Some(&request), &NormalizedResponse::default())
            .to_value()
            .unwrap();

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["parameters", "security", "requestBody", "responses"]);
    }

    #[test]
    fn test_unprocessable_response_fragment() {
        let response = NormalizedResponse::unprocessable(
            "The name field is required.",
            object(json!({"name": ["The name field is required."]})),
        );
        let value = build_operation(&ActionDescriptor::new(), None, &response)
            .to_value()
            .unwrap();

        assert_eq!(value["responses"]["422"]["description"], json!("Unprocessable Content"));
        assert_eq!(
            value["responses"]["422"]["content"]["application/json"]["schema"]["properties"]["errors"]
                ["properties"]["name"]["type"],
            json!("array")
        );
    }

    #[test]
    fn test_group_template() {
        let info = Info {
            title: "Widgets".to_string(),
            version: "2.0.0".to_string(),
            description: None,
        };

        assert_eq!(
            GroupDocument::template(&info).to_value().unwrap(),
            json!({
                "openapi": "3.0.0",
                "info": {"title": "Widgets", "version": "2.0.0"},
                "paths": {},
                "components": {
                    "securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer"}}
                }
            })
        );
    }
}
