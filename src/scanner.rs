use crate::error::{Error, Result};
use crate::naming::{last_segment, CONTROLLER_SUFFIX};
use crate::registry::Registry;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Source of candidate controller identifiers.
pub trait Discovery {
    /// Fully qualified controller names, in processing order.
    fn discover(&self) -> Result<Vec<String>>;
}

impl Discovery for Registry {
    fn discover(&self) -> Result<Vec<String>> {
        Ok(self.controllers().iter().map(|c| c.name().to_string()).collect())
    }
}

/// Controller discovery over a source directory.
///
/// Every `.rs` file below the root names one candidate controller. Subdirectories
/// extend the namespace, and file and directory names are converted to StudlyCase, so
/// `admin/user_controller.rs` under namespace `App::Http::Controllers` becomes
/// `App::Http::Controllers::Admin::UserController`. Hidden entries and `mod.rs` are
/// skipped, as is every file whose stem the optional filter rejects.
///
/// # Example
///
/// ```no_run
/// use openapi_from_invocation::scanner::{DirectoryScanner, Discovery};
/// use std::path::PathBuf;
///
/// let scanner = DirectoryScanner::new(PathBuf::from("src/controllers"), "App::Http::Controllers")
///     .with_filter(|stem| stem.ends_with("_controller"));
/// let controllers = scanner.discover().unwrap();
/// println!("Found {} controllers", controllers.len());
/// ```
pub struct DirectoryScanner {
    root_path: PathBuf,
    namespace: String,
    filter: Option<Box<dyn Fn(&str) -> bool>>,
}

impl DirectoryScanner {
    pub fn new(root_path: PathBuf, namespace: impl Into<String>) -> Self {
        Self {
            root_path,
            namespace: namespace.into(),
            filter: None,
        }
    }

    /// Keeps only files whose stem (`user_controller` for `user_controller.rs`)
    /// satisfies `filter`.
    pub fn with_filter(mut self, filter: impl Fn(&str) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }
}

impl Discovery for DirectoryScanner {
    fn discover(&self) -> Result<Vec<String>> {
        if !self.root_path.is_dir() {
            return Err(Error::Config(format!(
                "controller directory does not exist: {}",
                self.root_path.display()
            )));
        }

        let mut identifiers = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to access path: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some("mod") | None => continue,
                Some(stem) => stem,
            };
            if let Some(filter) = &self.filter {
                if !filter(stem) {
                    debug!("Filtered out {}", path.display());
                    continue;
                }
            }

            let mut segments: Vec<String> = Vec::new();
            if !self.namespace.is_empty() {
                segments.push(self.namespace.clone());
            }
            if let Ok(relative) = path.strip_prefix(&self.root_path) {
                if let Some(parent) = relative.parent() {
                    segments.extend(
                        parent
                            .iter()
                            .map(|dir| studly_case(&dir.to_string_lossy())),
                    );
                }
            }
            segments.push(studly_case(stem));

            let identifier = segments.join("::");
            debug!("Discovered {} at {}", identifier, path.display());
            identifiers.push(identifier);
        }

        Ok(identifiers)
    }
}

/// Which discovered controllers are processed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControllerFilter {
    /// Everything except names starting with `Controller`, the framework base
    #[default]
    Default,
    /// Every controller with this short or fully qualified name
    Only(String),
}

impl ControllerFilter {
    /// Narrows discovered identifiers down to the ones to process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControllerNotFound`] when `Only` matches nothing.
    pub fn apply(&self, identifiers: Vec<String>) -> Result<Vec<String>> {
        match self {
            ControllerFilter::Default => Ok(identifiers
                .into_iter()
                .filter(|id| {
                    let keep = !last_segment(id).starts_with(CONTROLLER_SUFFIX);
                    if !keep {
                        debug!("Skipping base controller {}", id);
                    }
                    keep
                })
                .collect()),
            ControllerFilter::Only(name) => {
                let kept: Vec<String> = identifiers
                    .into_iter()
                    .filter(|id| id == name || last_segment(id) == name)
                    .collect();
                if kept.is_empty() {
                    return Err(Error::ControllerNotFound(name.clone()));
                }
                Ok(kept)
            }
        }
    }
}

/// `user_profile` -> `UserProfile`; names that already contain upper-case letters
/// are kept.
fn studly_case(value: &str) -> String {
    if value.chars().any(char::is_uppercase) {
        return value.to_string();
    }
    value
        .split(|c: char| c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Controller;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_file(dir: &std::path::Path, relative: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_temp_file(root, "widget_controller.rs");
        create_temp_file(root, "admin/user_controller.rs");
        create_temp_file(root, "controller.rs");
        create_temp_file(root, "mod.rs");
        create_temp_file(root, "README.md");
        create_temp_file(root, ".hidden/secret_controller.rs");

        let scanner = DirectoryScanner::new(root.to_path_buf(), "App::Http::Controllers");
        let found = scanner.discover().unwrap();

        assert_eq!(
            found,
            vec![
                "App::Http::Controllers::Admin::UserController",
                "App::Http::Controllers::Controller",
                "App::Http::Controllers::WidgetController",
            ]
        );
    }

    #[test]
    fn test_scan_without_namespace() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_file(temp_dir.path(), "OrderController.rs");

        let found = DirectoryScanner::new(temp_dir.path().to_path_buf(), "")
            .discover()
            .unwrap();
        assert_eq!(found, vec!["OrderController"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(temp_dir.path().join("nope"), "App");

        assert!(matches!(scanner.discover(), Err(Error::Config(_))));
    }

    #[test]
    fn test_registry_discovery_keeps_order() {
        let registry = Registry::new()
            .register(Controller::new("App::B"))
            .register(Controller::new("App::A"));

        assert_eq!(registry.discover().unwrap(), vec!["App::B", "App::A"]);
    }

    #[test]
    fn test_default_filter_skips_base_controller() {
        let ids = vec![
            "App::Controller".to_string(),
            "App::ControllerHelpers".to_string(),
            "App::WidgetController".to_string(),
        ];

        assert_eq!(
            ControllerFilter::Default.apply(ids).unwrap(),
            vec!["App::WidgetController"]
        );
    }

    #[test]
    fn test_scan_with_stem_filter() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_temp_file(root, "widget_controller.rs");
        create_temp_file(root, "api_widget_controller.rs");
        create_temp_file(root, "helpers.rs");

        let found = DirectoryScanner::new(root.to_path_buf(), "App")
            .with_filter(|stem| stem.ends_with("_controller") && !stem.starts_with("api_"))
            .discover()
            .unwrap();

        assert_eq!(found, vec!["App::WidgetController"]);
    }

    #[test]
    fn test_only_filter_keeps_every_namespace_match() {
        let ids = vec![
            "App::WidgetController".to_string(),
            "App::OrderController".to_string(),
            "App::Admin::WidgetController".to_string(),
        ];

        assert_eq!(
            ControllerFilter::Only("WidgetController".to_string())
                .apply(ids.clone())
                .unwrap(),
            vec!["App::WidgetController", "App::Admin::WidgetController"]
        );
        assert_eq!(
            ControllerFilter::Only("App::Admin::WidgetController".to_string())
                .apply(ids.clone())
                .unwrap(),
            vec!["App::Admin::WidgetController"]
        );
        assert!(matches!(
            ControllerFilter::Only("OrderController".to_string()).apply(ids),
            Err(Error::ControllerNotFound(_))
        ));
    }

    #[test]
    fn test_studly_case() {
        assert_eq!(studly_case("user_profile_controller"), "UserProfileController");
        assert_eq!(studly_case("admin"), "Admin");
        assert_eq!(studly_case("WidgetController"), "WidgetController");
    }
}
