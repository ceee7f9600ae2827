use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use space_cartographer::{
    EDGE_GLUE, ElementKind, ExperimentsDictionary, PathwayResult, PlotOptions, ScopeLevel, Scene,
    SpaceGraph, VariantSelection,
};
use tracing_subscriber::EnvFilter;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "space-cartographer")]
#[command(about = "Space config dependency explorer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List endpoint candidate ids grouped by element type.
    Endpoints {
        #[arg(long)]
        config: String,
    },

    /// Dump the experiment dictionary.
    Experiments {
        #[arg(long)]
        config: String,
    },

    /// Walk upstream from one element.
    Pathway {
        #[arg(long)]
        config: String,

        #[arg(long)]
        from: String,

        /// Pin an experiment arm: scope:parameter:variant (repeatable).
        #[arg(long = "variant")]
        variants: Vec<VariantSelection>,
    },

    /// Emit the pre-layout node/edge set for a layout engine.
    Scene {
        #[arg(long)]
        config: String,

        /// Endpoint element id; omit for the whole graph.
        #[arg(long)]
        from: Option<String>,

        #[arg(long = "variant")]
        variants: Vec<VariantSelection>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Assemble the config and run the strict checks.
    Validate {
        #[arg(long)]
        config: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExperimentsOut<'a> {
    scope_levels: [ScopeLevel; 3],
    experiments: &'a ExperimentsDictionary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathwayOut<'a> {
    #[serde(flatten)]
    pathway: &'a PathwayResult,
    edge_ids: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Endpoints { config } => {
            let graph = load_graph(&config)?;
            print_json(&graph.endpoint_candidates())?;
        }
        Commands::Experiments { config } => {
            let graph = load_graph(&config)?;
            let dictionary = graph.experiments();
            print_json(&ExperimentsOut {
                scope_levels: dictionary.scope_levels(),
                experiments: dictionary,
            })?;
        }
        Commands::Pathway {
            config,
            from,
            variants,
        } => {
            let graph = load_graph(&config)?;
            let overrides = graph.experiments().resolve_selections(&variants)?;
            let pathway = space_cartographer::walk(&graph, &from, &overrides)
                .with_context(|| format!("walk pathway from {}", from))?;
            print_json(&PathwayOut {
                edge_ids: pathway.edge_ids(EDGE_GLUE),
                pathway: &pathway,
            })?;
        }
        Commands::Scene {
            config,
            from,
            variants,
            out,
        } => {
            let graph = load_graph(&config)?;
            let overrides = graph.experiments().resolve_selections(&variants)?;
            let scene = Scene::select(&graph, from.as_deref(), &overrides)?;
            let request = scene.layout_request(&PlotOptions::default());

            match out {
                Some(out) => {
                    std::fs::write(&out, serde_json::to_string_pretty(&request)?)
                        .with_context(|| format!("write scene file {}", out))?;
                    println!("Wrote {}", out);
                }
                None => print_json(&request)?,
            }
        }
        Commands::Validate { config } => {
            let graph = load_graph(&config)?;
            graph.validate_namespace()?;

            for kind in ElementKind::ALL {
                match graph.collection(kind) {
                    Some(elements) => println!("{:<11} {}", kind.collection_key(), elements.len()),
                    None => println!("{:<11} -", kind.collection_key()),
                }
            }
            if let Some(version) = graph.version() {
                println!("Version     {}", version);
            }
            println!("OK: {} nodes, acyclic", graph.len());
        }
    }

    Ok(())
}

fn load_graph(path: &str) -> Result<SpaceGraph> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read space config {}", path))?;
    let config: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse space config {}", path))?;
    let graph = SpaceGraph::build(&config).with_context(|| format!("assemble {}", path))?;
    Ok(graph)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
