use crate::config::DocConfig;
use crate::container::Container;
use crate::document_store::DocumentStore;
use crate::engine::{ActionOutcome, Engine, RunReport};
use crate::invoker::Mode;
use crate::registry::Registry;
use crate::scanner::{ControllerFilter, DirectoryScanner, Discovery};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate OpenAPI documentation by invoking documented handlers with synthesized requests
#[derive(Parser, Debug)]
#[command(name = "openapi-from-invocation")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Folder the group and action documents are written to [default: swagger]
    #[arg(long = "folder", value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Group document endpoints are registered into when a descriptor names none [default: root]
    #[arg(long = "group", value_name = "NAME")]
    pub group: Option<String>,

    /// Invoke every action and log its output without writing documents
    #[arg(long = "debug")]
    pub debug: bool,

    /// Only process the controller with this name
    #[arg(long = "class", value_name = "NAME")]
    pub class: Option<String>,

    /// Discover controllers from this source directory instead of the registry
    #[arg(long = "controllers", value_name = "DIR")]
    pub controllers: Option<PathBuf>,

    /// Namespace prefix of controllers discovered from a directory
    #[arg(long = "namespace", value_name = "NS")]
    pub namespace: Option<String>,

    /// YAML or JSON configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref dir) = args.controllers {
        if !dir.is_dir() {
            anyhow::bail!("Controller directory does not exist: {}", dir.display());
        }
    }

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    if let Some(ref class) = args.class {
        if class.trim().is_empty() {
            anyhow::bail!("--class needs a controller name");
        }
    }

    info!("Mode: {}", if args.debug { "debug" } else { "document" });
    if let Some(ref folder) = args.folder {
        info!("Output folder: {}", folder.display());
    }
    if let Some(ref group) = args.group {
        info!("Default group: {}", group);
    }
    match args.controllers {
        Some(ref dir) => info!("Controllers: {}", dir.display()),
        None => info!("Controllers: registry"),
    }
    if let Some(ref class) = args.class {
        info!("Only controller: {}", class);
    }

    Ok(args)
}

/// Merges the configuration file, if any, with command line overrides.
pub fn resolve_config(args: &CliArgs) -> Result<DocConfig> {
    let mut config = match &args.config {
        Some(path) => DocConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => DocConfig::default(),
    };

    if let Some(folder) = &args.folder {
        config.folder = folder.clone();
    }
    if let Some(group) = &args.group {
        config.group = group.clone();
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }

    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs, registry: &Registry, container: &Container) -> Result<RunReport> {
    info!("Starting documentation run...");

    // Step 1: Resolve configuration
    let config = resolve_config(&args)?;
    debug!("Configuration: {:?}", config);

    // Step 2: Pick discovery
    let scanner;
    let discovery: &dyn Discovery = match &args.controllers {
        Some(dir) => {
            info!("Scanning {} for controllers...", dir.display());
            scanner = DirectoryScanner::new(dir.clone(), config.namespace.clone());
            &scanner
        }
        None => registry,
    };
    let filter = match &args.class {
        Some(class) => ControllerFilter::Only(class.clone()),
        None => ControllerFilter::Default,
    };

    // Step 3: Run every documented action
    let mode = if args.debug { Mode::Lenient } else { Mode::Strict };
    let store = DocumentStore::new(config.folder.clone(), config.group.clone(), config.info());
    let engine = Engine::new(registry, container, store)
        .with_mode(mode)
        .with_server(config.server.clone());

    let report = engine
        .run(discovery, &filter)
        .context("Documentation run aborted")?;

    // Step 4: Display summary
    for outcome in &report.outcomes {
        if let ActionOutcome::Skipped { controller, action, failure } = outcome {
            warn!("Skipped {}::{}(): {}", controller, action, failure);
        }
    }
    info!("Run complete!");
    info!("Summary:");
    info!("  - Documented: {}", report.documented());
    info!("  - Explored: {}", report.explored());
    info!("  - Skipped: {}", report.skipped());
    if mode == Mode::Strict {
        info!("  - Output folder: {}", config.folder.display());
    }

    Ok(report)
}
