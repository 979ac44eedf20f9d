// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use arbor_cache::{CacheError, SledStore, SnapshotStore, SnapshotStoreConfig};
use arbor_core::{Expansion, LazyLoader, Node, Tree, TreeError, Workspace, WorkspaceConfig};
use arbor_providers::{sample_tree, DemoLoader, LoaderRegistry, StaticLoader};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

pub type CliResult<T> = Result<T, CliError>;

/// Settings shared by every command
pub struct Context {
    pub config: Config,
    pub db_path: Option<PathBuf>,
    pub loader: Option<String>,
    pub verbose: bool,
}

impl Context {
    fn store_config(&self) -> SnapshotStoreConfig {
        match self.db_path.clone().or_else(|| self.config.db_path.clone()) {
            Some(path) => SnapshotStoreConfig { path },
            None => SnapshotStoreConfig::default(),
        }
    }

    fn registry(&self) -> CliResult<LoaderRegistry> {
        let mut registry = LoaderRegistry::new();
        registry.register(Arc::new(DemoLoader::new(self.config.demo.clone())));

        let listings = match &self.config.static_listings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
                StaticLoader::from_json(&json)
                    .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?
            }
            None => StaticLoader::new(),
        };
        registry.register(Arc::new(listings));
        Ok(registry)
    }

    fn loader(&self) -> CliResult<Arc<dyn LazyLoader>> {
        let id = self.loader.as_deref().unwrap_or(&self.config.loader);
        Ok(self.registry()?.get_or_err(id)?)
    }
}

/// A workspace restored from, and saved back to, the snapshot store
struct Session {
    store: SledStore,
    workspace: Workspace,
}

impl Session {
    /// First run starts from the sample tree
    async fn open(ctx: &Context) -> CliResult<Self> {
        let store_config = ctx.store_config();
        if ctx.verbose {
            eprintln!("Workspace: {}", store_config.path.display());
        }
        let store = SledStore::open(&store_config)?;
        let tree = match store.load().await? {
            Some(snapshot) => snapshot.tree,
            None => Some(sample_tree()?),
        };
        let workspace = Workspace::new(tree, ctx.loader()?).with_config(WorkspaceConfig {
            load_timeout: ctx.config.load_timeout(),
        });
        Ok(Self { store, workspace })
    }

    async fn tree(&self) -> CliResult<Tree> {
        self.workspace.snapshot().await.ok_or(CliError::Tree(TreeError::NoTree))
    }

    async fn save(&self) -> CliResult<()> {
        let tree = self.workspace.snapshot().await;
        self.store.save(tree.as_ref()).await?;
        Ok(())
    }
}

fn describe(node: &Node) -> String {
    if node.is_leaf() {
        node.label().to_string()
    } else {
        style(format!("{}/", node.label())).cyan().bold().to_string()
    }
}

/// Indented outline of `tree`, starting at `from` when given
fn render(tree: &Tree, from: Option<&str>) -> CliResult<String> {
    let start = from.unwrap_or(tree.root_id().as_str());
    let walk = tree.walk_from(start).ok_or_else(|| TreeError::NotFound(start.to_string()))?;

    let mut out = String::new();
    for (node, depth) in walk {
        let marker = if node.needs_load() { style(" …").dim().to_string() } else { String::new() };
        out.push_str(&format!(
            "{:indent$}{}{} {}\n",
            "",
            describe(node),
            marker,
            style(format!("[{}]", node.id())).dim(),
            indent = depth * 2
        ));
    }
    Ok(out)
}

/// Print the tree
pub async fn show(ctx: &Context, from: Option<&str>) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    match session.workspace.snapshot().await {
        Some(tree) => print!("{}", render(&tree, from)?),
        None => println!("(empty workspace, run `arbor reset`)"),
    }
    Ok(())
}

/// Create a file or folder
pub async fn add(ctx: &Context, folder: &str, label: &str, is_folder: bool) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    let id = session.workspace.insert(folder, label, is_folder).await?;
    session.save().await?;
    println!("Created {} {}", label.trim(), style(format!("[{id}]")).dim());
    Ok(())
}

/// Delete nodes, asking first unless forced
pub async fn rm(ctx: &Context, ids: &[String], force: bool) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    for id in ids {
        let Some(node) = session.workspace.find(id).await else {
            if ctx.verbose {
                eprintln!("Skipping unknown node {id}");
            }
            continue;
        };

        if !force {
            let confirmed = Confirm::new()
                .with_prompt(format!("Are you sure you want to delete \"{}\"?", node.label()))
                .default(false)
                .interact()
                .map_err(|e| CliError::Prompt(e.to_string()))?;
            if !confirmed {
                continue;
            }
        }

        session.workspace.delete(id).await?;
        println!("Deleted {}", node.label());
    }
    session.save().await
}

pub async fn rename(ctx: &Context, id: &str, label: &str) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    session.workspace.rename(id, label).await?;
    session.save().await?;
    if ctx.verbose {
        eprintln!("Renamed {id} to {}", label.trim());
    }
    Ok(())
}

pub async fn mv(ctx: &Context, source: &str, target: &str) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    session.workspace.move_node(source, target).await?;
    session.save().await?;
    if ctx.verbose {
        eprintln!("Moved {source} into {target}");
    }
    Ok(())
}

/// Expand a folder, loading its children if needed
pub async fn expand(ctx: &Context, id: &str) -> CliResult<()> {
    let session = Session::open(ctx).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    spinner.set_message(format!("Loading {id}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = session.workspace.expand(id).await;
    spinner.finish_and_clear();

    match outcome? {
        Expansion::Loaded(items) => {
            debug!(id, count = items.len(), "expanded");
            session.save().await?;
        }
        Expansion::Cached(_) => {
            if ctx.verbose {
                eprintln!("{id} was already loaded");
            }
        }
        Expansion::Stale => {
            eprintln!("{id} changed while loading; listing discarded");
            return Ok(());
        }
    }

    let tree = session.tree().await?;
    print!("{}", render(&tree, Some(id))?);
    Ok(())
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Show details for one node
pub async fn find(ctx: &Context, id: &str) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    let tree = session.tree().await?;
    let node = tree.find_by_id(id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;

    let kind = if node.is_leaf() { "file" } else { "folder" };
    let children = match node.children_state() {
        None => "-".to_string(),
        Some(_) if node.needs_load() => "not loaded".to_string(),
        Some(_) => node.children().map_or(0, <[_]>::len).to_string(),
    };
    let path = tree
        .path_to(id)
        .iter()
        .map(|n| n.label())
        .collect::<Vec<_>>()
        .join(" / ");

    let rows = vec![
        NodeRow { field: "Id", value: node.id().to_string() },
        NodeRow { field: "Label", value: node.label().to_string() },
        NodeRow { field: "Kind", value: kind.to_string() },
        NodeRow { field: "Children", value: children },
        NodeRow {
            field: "Parent",
            value: node.parent_id().map_or_else(|| "-".to_string(), ToString::to_string),
        },
        NodeRow { field: "Path", value: path },
    ];
    println!("{}", Table::new(rows));
    Ok(())
}

/// Replace the workspace with a fresh tree
pub async fn reset(ctx: &Context, force: bool) -> CliResult<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Discard the current tree and start over?")
            .default(false)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))?;
        if !confirmed {
            return Ok(());
        }
    }

    let store = SledStore::open(&ctx.store_config())?;
    let tree = store.reset().await?;
    println!("Workspace reset {}", style(format!("[{}]", tree.root_id())).dim());
    Ok(())
}

/// Validate the stored tree
pub async fn check(ctx: &Context) -> CliResult<()> {
    let session = Session::open(ctx).await?;
    match session.workspace.snapshot().await {
        Some(tree) => {
            tree.validate()?;
            println!("{} {} nodes", style("ok").green(), tree.len());
        }
        None => println!("(empty workspace)"),
    }
    Ok(())
}

/// List registered lazy loaders
pub async fn loaders(ctx: &Context) -> CliResult<()> {
    let selected = ctx.loader.as_deref().unwrap_or(&ctx.config.loader);
    for id in ctx.registry()?.list() {
        if id == selected {
            println!("{} {}", style("*").green(), id);
        } else {
            println!("  {id}");
        }
    }
    Ok(())
}
