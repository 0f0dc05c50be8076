// SPDX-License-Identifier: MIT OR Apache-2.0
//! geoscript - build call scripts into node graphs and decompile them back.
//!
//! ```bash
//! geoscript functions --category mesh
//! geoscript build tower.py --store scene.ron
//! geoscript decompile --store scene.ron --graph Tower --json
//! geoscript layout --store scene.ron --graph Tower
//! ```

use clap::{Parser, Subcommand};
use geoscript_compiler::{
    decompile, lower_program, parse_program, CompileError, CompilerSettings, DecompileError, ParseError,
    Session, SettingsError,
};
use geoscript_graph::{arrange, catalog, GraphStore, LayoutError, NodeKindRegistry, RegistryError};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "geoscript")]
#[command(version)]
#[command(about = "Bidirectional compiler between geometry scripts and node graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Descriptor table to use instead of the built-in catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Compiler settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List the node functions scripts can call
    Functions {
        /// Only functions under this category path
        #[arg(long)]
        category: Option<String>,
    },

    /// Parse a script and build it into a graph store
    Build {
        /// Script file
        script: PathBuf,

        /// Graph store file, created when missing
        #[arg(long)]
        store: PathBuf,
    },

    /// Print the script that rebuilds a graph
    Decompile {
        /// Graph store file
        #[arg(long)]
        store: PathBuf,

        /// Graph name
        #[arg(long)]
        graph: String,

        /// Print the program as JSON instead of script text
        #[arg(long)]
        json: bool,
    },

    /// Re-run column layout on a graph
    Layout {
        /// Graph store file
        #[arg(long)]
        store: PathBuf,

        /// Graph name
        #[arg(long)]
        graph: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Script {}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Decompile(#[from] DecompileError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Graph '{0}' not found in store")]
    UnknownGraph(String),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("geoscript=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let session = load_session(cli.catalog.as_deref(), cli.settings.as_deref())?;

    match cli.command {
        Command::Functions { category } => {
            let functions = session.functions();
            let listed: Vec<_> = match &category {
                Some(path) => functions.in_category(path).collect(),
                None => functions.iter().collect(),
            };
            for function in &listed {
                println!("{:<28} {:<36} {}", function.name, function.kind, function.category_path);
            }
            tracing::debug!("Listed {} functions", listed.len());
        }

        Command::Build { script, store } => {
            let text = std::fs::read_to_string(&script).map_err(|source| CliError::Io {
                path: script.clone(),
                source,
            })?;
            let program = parse_program(&text).map_err(|source| CliError::Parse {
                path: script.clone(),
                source,
            })?;

            let mut graphs = if store.exists() {
                load_store(&store)?
            } else {
                GraphStore::new()
            };
            {
                let mut cx = session.context(&mut graphs);
                lower_program(&mut cx, &program)?;
            }
            save_store(&graphs, &store)?;
            tracing::info!("Built '{}' into {}", program.name, store.display());
        }

        Command::Decompile { store, graph, json } => {
            let graphs = load_store(&store)?;
            let tree = graphs.get(&graph).ok_or_else(|| CliError::UnknownGraph(graph.clone()))?;
            let program = decompile(tree, session.registry())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                print!("{}", program.render());
            }
        }

        Command::Layout { store, graph } => {
            let mut graphs = load_store(&store)?;
            let tree = graphs
                .get_mut(&graph)
                .ok_or_else(|| CliError::UnknownGraph(graph.clone()))?;
            arrange(tree, &session.settings().layout)?;
            save_store(&graphs, &store)?;
            tracing::info!("Arranged '{graph}'");
        }
    }
    Ok(())
}

fn load_session(catalog_path: Option<&Path>, settings_path: Option<&Path>) -> Result<Session, CliError> {
    let registry = match catalog_path {
        Some(path) => NodeKindRegistry::load(path)?,
        None => catalog::standard_registry(),
    };
    let settings = match settings_path {
        Some(path) => CompilerSettings::load(path)?,
        None => CompilerSettings::default(),
    };
    Ok(Session::new(registry, settings))
}

fn load_store(path: &Path) -> Result<GraphStore, CliError> {
    GraphStore::load(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn save_store(store: &GraphStore, path: &Path) -> Result<(), CliError> {
    store.save(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "geoscript",
            "decompile",
            "--store",
            "scene.ron",
            "--graph",
            "Tower",
            "--json",
            "--catalog",
            "nodes.ron",
        ])
        .unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("nodes.ron")));
        let Command::Decompile { graph, json, .. } = cli.command else {
            panic!("expected decompile");
        };
        assert_eq!(graph, "Tower");
        assert!(json);
    }

    #[test]
    fn test_missing_graph_is_reported() {
        let dir = std::env::temp_dir().join(format!("geoscript-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = dir.join("empty.ron");
        GraphStore::new().save(&store).unwrap();

        let cli = Cli::try_parse_from([
            "geoscript",
            "layout",
            "--store",
            store.to_str().unwrap(),
            "--graph",
            "Nowhere",
        ])
        .unwrap();
        assert!(matches!(run(cli), Err(CliError::UnknownGraph(name)) if name == "Nowhere"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
