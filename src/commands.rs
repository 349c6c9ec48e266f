//! CLI command implementations

use crate::config::ArchgraphConfig;
use anyhow::Context;
use archgraph_core::{clean_architecture, feature_structure, related_ids, DiffEngine, GraphStore, Layer};
use archgraph_parser::{rust_parser_pool, ArchitectureParser, RustSourceParser};
use archgraph_repository::RepositoryFacade;
use archgraph_watcher::SyncEngine;
use serde::Serialize;
use std::sync::Arc;

fn source_parser(config: &ArchgraphConfig) -> RustSourceParser {
    RustSourceParser::new(rust_parser_pool(config.parser_workers))
        .with_extensions(config.extensions.clone())
        .with_ignore_dirs(config.ignore_dirs.clone())
}

async fn load(config: &ArchgraphConfig) -> GraphStore {
    tracing::info!("Indexing {}", config.root.display());
    source_parser(config).parse_tree(&config.root).await
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn index(config: ArchgraphConfig, json: bool) -> anyhow::Result<()> {
    let store = load(&config).await;

    if json {
        return print_json(&store.all_nodes());
    }

    println!("{} components", store.len());
    for layer in Layer::ALL {
        let nodes = store.nodes_by_layer(layer);
        if nodes.is_empty() {
            continue;
        }
        println!("\n{} ({})", layer, nodes.len());
        for node in nodes {
            println!(
                "  {:<32} {:?}, {} deps, {} methods",
                node.id,
                node.kind,
                node.dependencies.len(),
                node.methods.len()
            );
        }
    }
    Ok(())
}

pub async fn show(config: ArchgraphConfig, id: String) -> anyhow::Result<()> {
    let store = load(&config).await;
    let node = store
        .node(&id)
        .with_context(|| format!("no component named {}", id))?;
    print_json(node)
}

pub async fn chain(config: ArchgraphConfig, id: String) -> anyhow::Result<()> {
    let store = load(&config).await;
    anyhow::ensure!(store.contains(&id), "no component named {}", id);

    let ids: Vec<&str> = store
        .complete_dependency_chain(&id)
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    println!("{}", ids.join(" -> "));
    Ok(())
}

pub async fn related(config: ArchgraphConfig, id: String) -> anyhow::Result<()> {
    let store = load(&config).await;
    anyhow::ensure!(store.contains(&id), "no component named {}", id);

    for other in related_ids(&store, &id) {
        let marker = if store.contains(&other) { "" } else { " (unresolved)" };
        println!("{}{}", other, marker);
    }
    Ok(())
}

pub fn blueprint(feature: Option<String>, view_model: bool) -> anyhow::Result<()> {
    match feature {
        Some(name) => print_json(&feature_structure(&name, view_model)),
        None => print_json(&clean_architecture().all_nodes()),
    }
}

/// Keep the graph in sync with the tree and print one JSON diff per change.
pub async fn watch(config: ArchgraphConfig) -> anyhow::Result<()> {
    let parser = Arc::new(source_parser(&config));
    let repository = Arc::new(RepositoryFacade::with_store(
        parser.parse_tree(&config.root).await,
    ));
    tracing::info!("Loaded {} components", repository.store().len());

    let engine = SyncEngine::new(Arc::clone(&repository), parser, config.sync_config());
    engine
        .start(&config.root)
        .with_context(|| format!("cannot watch {}", config.root.display()))?;

    let mut updates = repository.subscribe_store();
    let mut previous = updates.borrow_and_update().clone();
    let mut diffs = DiffEngine::new();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                let diff = diffs.compute_diff(&previous, &current);
                if !diff.is_empty() {
                    println!("{}", serde_json::to_string(&diff)?);
                }
                previous = current;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    engine.shutdown();
    Ok(())
}
