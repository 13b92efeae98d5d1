//! CLI command implementations.

use crate::config::Config;
use crate::provider::DirectoryService;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::Resource;
use stratus_graph::{GraphStore, ResourceGraph};
use stratus_sync::{LookupMode, ServiceRegistry, SyncCoordinator};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Builds the coordinator for the configured services.
fn coordinator(config: &Config) -> Result<SyncCoordinator> {
    let store = GraphStore::open(&config.store_path)?;
    let registry = config
        .services
        .iter()
        .fold(ServiceRegistry::new(), |registry, name| {
            registry.register(Arc::new(DirectoryService::new(name.as_str(), &config.source_dir)))
        });
    Ok(SyncCoordinator::new(registry, store))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

/// Write a default config and create the data directories.
pub fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("{} Already initialized ({})", "✓".green(), config_path.display());
        return Ok(());
    }

    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let config = Config::with_base(base);
    config.save(config_path)?;
    fs::create_dir_all(&config.source_dir)?;
    fs::create_dir_all(&config.store_path)?;

    println!("{} Initialized Stratus in {}", "✓".green(), base.display());
    println!(
        "  Drop service exports into {} and run {}",
        config.source_dir.display().to_string().cyan(),
        "stratus sync".cyan()
    );

    Ok(())
}

/// Sync all services, or only the named ones.
pub async fn sync(config: &Config, services: &[String]) -> Result<()> {
    let coordinator = coordinator(config)?;

    let spinner = spinner("Fetching resources...")?;
    let synced = if services.is_empty() {
        coordinator.full_sync().await
    } else {
        let mut synced = std::collections::BTreeMap::new();
        let mut failure = None;
        for service in services {
            match coordinator.targeted_sync(service).await {
                Ok(graph) => {
                    synced.insert(service.clone(), graph);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(synced),
        }
    };
    spinner.finish_and_clear();

    for (service, graph) in synced? {
        print_sync_summary(&service, &graph);
    }

    Ok(())
}

fn print_sync_summary(service: &str, graph: &ResourceGraph) {
    let stats = graph.stats();
    println!(
        "{} {} {} resources, {} relations",
        "✓".green(),
        service.cyan(),
        stats.resources.to_string().cyan(),
        stats.relations
    );
}

/// Show a resource and its relations.
pub async fn show(config: &Config, id: &str, mode: LookupMode) -> Result<()> {
    let coordinator = coordinator(config)?;

    let outcome = coordinator.lookup(id, mode).await?;
    let Some(found) = outcome.found() else {
        println!("{} resource with id {} not found", "✗".red(), id.cyan());
        return Ok(());
    };

    print_resource(&found.resource, &found.service);

    let graph = &found.graph;
    let root = &found.resource;

    println!("\n{}", "Parents:".bold());
    graph.visit_parents(root, print_with_tabs);

    println!("\n{}", "Children:".bold());
    graph.visit_children(root, print_with_tabs);

    print_resource_list("Siblings", &graph.siblings(root));
    print_resource_list("Applied on", &graph.list_resources_applied_on(root));
    print_resource_list("Depending on", &graph.list_resources_depending_on(root));

    Ok(())
}

fn print_resource(resource: &Resource, service: &str) {
    println!(
        "{} {} {}",
        resource.resource_type.yellow(),
        resource.id.cyan().bold(),
        format!("({})", service).dimmed()
    );
    for (name, value) in &resource.properties {
        println!("  {} {}", format!("{}:", name).dimmed(), value);
    }
}

fn print_with_tabs(resource: &Resource, distance: usize) {
    println!("{}{}", "\t".repeat(distance), resource);
}

fn print_resource_list(title: &str, list: &[&Resource]) {
    if list.is_empty() {
        return;
    }
    let all: Vec<String> = list.iter().map(|r| r.to_string()).collect();
    println!("\n{}: {}", title.bold(), all.join(", "));
}

/// Show stored snapshots per configured service.
pub fn status(config: &Config) -> Result<()> {
    let store = GraphStore::open(&config.store_path)?;

    println!("{}", "Stratus Status".cyan().bold());
    println!();
    println!("  {} {}", "Store:".dimmed(), config.store_path.display());
    println!("  {} {}", "Sources:".dimmed(), config.source_dir.display());
    println!();

    for service in &config.services {
        match store.info(service)? {
            Some(info) => println!(
                "  {} {} resources, {} relations, synced {}",
                format!("{:<12}", service).cyan(),
                info.resources,
                info.relations,
                info.synced_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!(
                "  {} {}",
                format!("{:<12}", service).cyan(),
                "never synced".yellow()
            ),
        }
    }

    Ok(())
}
