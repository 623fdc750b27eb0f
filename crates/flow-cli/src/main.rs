use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use flow_config::{
    ChildWorkflowExpansion, ConfigurationBuilder, OutputFormat, SignalResolutionStrategy,
    SignalVisualizationMode,
};

#[derive(Parser)]
#[command(name = "flowviz", about = "Static flowchart and path analysis for Temporal workflow source")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SharedOpts {
    /// Path to the workflow source file.
    path: PathBuf,

    /// Workflow class name, when the file defines more than one.
    #[arg(long)]
    workflow: Option<String>,

    /// diagram-only | paths-only | full
    #[arg(long, default_value = "full")]
    output_format: String,

    #[arg(long)]
    no_validation: bool,

    #[arg(long)]
    max_decision_points: Option<usize>,

    #[arg(long)]
    max_paths: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single workflow's flowchart and path list.
    Analyze {
        #[command(flatten)]
        opts: SharedOpts,
    },
    /// Resolve and render a workflow's child-workflow graph.
    Graph {
        #[command(flatten)]
        opts: SharedOpts,

        /// Directories to search for referenced child workflows.
        #[arg(long = "search-dir")]
        search_dirs: Vec<PathBuf>,

        /// reference | inline | subgraph
        #[arg(long, default_value = "inline")]
        child_workflow_expansion: String,
    },
    /// Discover and render a workflow's external-signal peer graph.
    Signals {
        #[command(flatten)]
        opts: SharedOpts,

        #[arg(long = "search-dir")]
        search_dirs: Vec<PathBuf>,

        /// by-name | explicit | hybrid
        #[arg(long, default_value = "hybrid")]
        signal_resolution_strategy: String,

        /// subgraph | unified
        #[arg(long, default_value = "subgraph")]
        signal_visualization_mode: String,
    },
}

fn parse_arg<T: FromStr>(flag: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("--{flag} {value:?}: {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Analyze { opts } => {
            let config = build_config(&opts, None, None, None)?;
            flow_engine::analyze_workflow(&opts.path, opts.workflow.as_deref(), &config)
                .map_err(|e| anyhow::anyhow!("{e}"))?
        }
        Commands::Graph {
            opts,
            search_dirs,
            child_workflow_expansion,
        } => {
            let expansion: ChildWorkflowExpansion =
                parse_arg("child-workflow-expansion", &child_workflow_expansion)?;
            let config = build_config(&opts, Some(expansion), None, None)?;
            flow_engine::analyze_workflow_graph(
                &opts.path,
                opts.workflow.as_deref(),
                &search_dirs,
                &config,
            )
            .map_err(|e| anyhow::anyhow!("{e}"))?
        }
        Commands::Signals {
            opts,
            search_dirs,
            signal_resolution_strategy,
            signal_visualization_mode,
        } => {
            let strategy: SignalResolutionStrategy =
                parse_arg("signal-resolution-strategy", &signal_resolution_strategy)?;
            let viz_mode: SignalVisualizationMode =
                parse_arg("signal-visualization-mode", &signal_visualization_mode)?;
            let config = build_config(&opts, None, Some(strategy), Some(viz_mode))?;
            flow_engine::analyze_signal_graph(
                &opts.path,
                opts.workflow.as_deref(),
                &search_dirs,
                &config,
            )
            .map_err(|e| anyhow::anyhow!("{e}"))?
        }
    };

    println!("{output}");
    Ok(())
}

fn build_config(
    opts: &SharedOpts,
    child_workflow_expansion: Option<ChildWorkflowExpansion>,
    signal_resolution_strategy: Option<SignalResolutionStrategy>,
    signal_visualization_mode: Option<SignalVisualizationMode>,
) -> Result<flow_config::Configuration> {
    let output_format: OutputFormat = parse_arg("output-format", &opts.output_format)?;
    let mut builder = ConfigurationBuilder::new()
        .output_format(output_format)
        .suppress_validation(opts.no_validation);
    if let Some(n) = opts.max_decision_points {
        builder = builder.max_decision_points(n);
    }
    if let Some(n) = opts.max_paths {
        builder = builder.max_paths(n);
    }
    if let Some(v) = child_workflow_expansion {
        builder = builder.child_workflow_expansion(v);
    }
    if let Some(v) = signal_resolution_strategy {
        builder = builder.signal_resolution_strategy(v);
    }
    if let Some(v) = signal_visualization_mode {
        builder = builder.signal_visualization_mode(v);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{e}"))
}
