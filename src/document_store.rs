//! Persisted action and group documents.
//!
//! Every action round-trips through read, merge, write; nothing is cached between
//! actions. The pure merge steps ([`merge_action`], [`merge_path`]) are separate from
//! the filesystem so they can be checked on their own.

use crate::descriptor::ActionDescriptor;
use crate::error::{Error, Result};
use crate::naming::normalize_endpoint;
use crate::openapi_builder::{build_operation, GroupDocument, Info};
use crate::request::SynthesizedRequest;
use crate::response::NormalizedResponse;
use crate::serializer::{read_document, write_document, StoredDocument};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const RESPONSES: &str = "responses";
const PATHS: &str = "paths";
const REF: &str = "$ref";

/// Output folder with its group and action documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    folder: PathBuf,
    default_group: String,
    info: Info,
}

impl DocumentStore {
    pub fn new(folder: impl Into<PathBuf>, default_group: impl Into<String>, info: Info) -> Self {
        Self {
            folder: folder.into(),
            default_group: default_group.into(),
            info,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// `<folder>/<group>.json`, using the default group when `group` is `None`.
    pub fn group_document_path(&self, group: Option<&str>) -> PathBuf {
        let group = group.unwrap_or(&self.default_group);
        self.folder.join(format!("{}.json", group))
    }

    /// `<folder>/<controller_folder>/<file_name>`.
    pub fn action_document_path(&self, controller_folder: &str, file_name: &str) -> PathBuf {
        self.folder.join(controller_folder).join(file_name)
    }

    /// Merges the fragment of one invocation into the action document at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Action document, usually from [`DocumentStore::action_document_path`]
    /// * `method` - HTTP method; stored lower-cased
    /// * `descriptor` - Sample inputs the parameters are inferred from
    /// * `request` - Synthesized request, when one was built
    /// * `response` - Normalized response recorded under its status code
    ///
    /// # Returns
    ///
    /// `Ok(())` once the merged document is on disk. Methods and status codes recorded
    /// by earlier runs are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written. An existing
    /// document that cannot be parsed is replaced with a warning.
    pub fn write_action(
        &self,
        path: &Path,
        method: &str,
        descriptor: &ActionDescriptor,
        request: Option<&SynthesizedRequest>,
        response: &NormalizedResponse,
    ) -> Result<()> {
        let method = method.to_lowercase();
        let fragment = match build_operation(descriptor, request, response).to_value()? {
            Value::Object(fragment) => fragment,
            _ => Map::new(),
        };

        let existing = match read_document(path) {
            StoredDocument::Absent => None,
            StoredDocument::Parsed(document) => Some(document),
            StoredDocument::Unreadable(reason) => {
                warn!(
                    "Action document {} is unreadable ({}), overwriting it",
                    path.display(),
                    reason
                );
                None
            }
        };

        let document = merge_action(existing, &method, fragment);
        write_document(Value::Object(document), path)?;
        info!("{}", path.display());
        Ok(())
    }

    /// Registers `endpoint` in the group document at `group_path`, pointing at
    /// `folder/file_name`.
    ///
    /// # Arguments
    ///
    /// * `group_path` - Group document; created from the template when absent
    /// * `endpoint` - Path such as `/widgets/{id}`; a leading `/` is added if missing
    /// * `folder` - Controller folder of the action document
    /// * `file_name` - Action document file name
    ///
    /// # Returns
    ///
    /// Whether the document changed. An endpoint that is already registered keeps its
    /// first reference and the file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupDocumentUnreadable`] if the existing group document is not
    /// valid JSON or its `paths` is not an object, and an IO error if writing fails.
    pub fn register_path(
        &self,
        group_path: &Path,
        endpoint: &str,
        folder: &str,
        file_name: &str,
    ) -> Result<bool> {
        let unreadable = |reason: String| Error::GroupDocumentUnreadable {
            path: group_path.to_path_buf(),
            reason,
        };

        let mut document = match read_document(group_path) {
            StoredDocument::Absent => {
                debug!("Creating group document {}", group_path.display());
                match GroupDocument::template(&self.info).to_value()? {
                    Value::Object(document) => document,
                    _ => Map::new(),
                }
            }
            StoredDocument::Parsed(document) => document,
            StoredDocument::Unreadable(reason) => return Err(unreadable(reason)),
        };

        let reference = format!("{}/{}", folder, file_name);
        let inserted = merge_path(&mut document, endpoint, &reference).map_err(unreadable)?;
        if !inserted {
            debug!(
                "Endpoint {} already registered in {}",
                normalize_endpoint(endpoint),
                group_path.display()
            );
            return Ok(false);
        }

        write_document(Value::Object(document), group_path)?;
        Ok(true)
    }
}

/// Merges a fresh operation `fragment` for `method` into an action document.
///
/// Other methods are kept verbatim. The current method is replaced by `fragment`,
/// except that its responses keep every previously recorded status code and only the
/// fragment's status codes are inserted or replaced.
pub fn merge_action(
    existing: Option<Map<String, Value>>,
    method: &str,
    mut fragment: Map<String, Value>,
) -> Map<String, Value> {
    let mut document = existing.unwrap_or_default();

    let mut responses = document
        .get(method)
        .and_then(|operation| operation.get(RESPONSES))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(Value::Object(fresh)) = fragment.get(RESPONSES) {
        for (status, response) in fresh {
            responses.insert(status.clone(), response.clone());
        }
    }
    fragment.insert(RESPONSES.to_string(), Value::Object(responses));

    document.insert(method.to_string(), Value::Object(fragment));
    document
}

/// Adds `{"$ref": reference}` under `paths[endpoint]` unless the endpoint is already
/// present. The endpoint is normalized to start with `/`.
pub fn merge_path(
    document: &mut Map<String, Value>,
    endpoint: &str,
    reference: &str,
) -> std::result::Result<bool, String> {
    let paths = document
        .entry(PATHS)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| "\"paths\" is not an object".to_string())?;

    let endpoint = normalize_endpoint(endpoint);
    if paths.contains_key(&endpoint) {
        return Ok(false);
    }

    let mut pointer = Map::new();
    pointer.insert(REF.to_string(), Value::String(reference.to_string()));
    paths.insert(endpoint, Value::Object(pointer));
    Ok(true)
}
