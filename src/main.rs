//! fuzzy-explorer CLI - Fuzzy Graphs and Picture Fuzzy Sets
//!
//! Runs one demo computation per subcommand, or serves the web explorer.
//!
//! Usage:
//!   fuzzy-explorer [OPTIONS] <COMMAND>

use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use fuzzy_explorer::{
    ClusteringReport, CompositionBuilder, CompositionReport, DEFAULT_HEIGHT, Diagram, Edge,
    ExplorerConfig, FuzzyGraph, MembershipReport, Rendered, ValidationReport, detect_renderer,
    discover_config, load_config, maximum_spanning_forest, partition, render_or_fallback,
    web::{AppState, ServerConfig, start_server},
    write_clustering, write_composition, write_forest, write_json, write_membership,
    write_validation,
};

/// fuzzy-explorer - Explore fuzzy graphs and picture fuzzy sets
#[derive(Parser, Debug)]
#[command(name = "fuzzy-explorer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: search for .fuzzy-explorer.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Membership of a height in the fuzzy set of tall people
    Membership {
        /// Height in cm
        #[arg(default_value_t = DEFAULT_HEIGHT, allow_negative_numbers = true)]
        height: f64,
    },

    /// Check a fuzzy graph against μ(u, v) <= min(σ(u), σ(v))
    Validate {
        /// Vertex with its existence degree, e.g. A=0.9 (repeatable)
        #[arg(long = "vertex", value_name = "ID=SIGMA", value_parser = parse_vertex)]
        vertices: Vec<(String, f64)>,

        /// Edge with its strength degree, e.g. A:B=0.7 (repeatable)
        #[arg(long = "edge", value_name = "U:V=MU", value_parser = parse_edge)]
        edges: Vec<Edge>,

        /// Also report the strength of connectedness between two vertices
        #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
        connectedness: Option<Vec<String>>,
    },

    /// Cut similarity links below a threshold and list the clusters
    Cluster {
        /// Similarity threshold α (default: from config, else 0.65)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Show the maximum spanning forest of the edges instead
        #[arg(long)]
        forest: bool,
    },

    /// Complete a picture fuzzy value with its refusal degree
    Compose {
        #[arg(long, default_value_t = 0.5)]
        support: f64,

        #[arg(long, default_value_t = 0.2)]
        opposition: f64,

        #[arg(long, default_value_t = 0.1)]
        abstention: f64,
    },

    /// Render a diagram with Graphviz (or print installation instructions)
    Render {
        #[arg(value_enum)]
        target: RenderTarget,

        /// Similarity threshold for the clusters diagram
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print the DOT source instead of rendering it
        #[arg(long)]
        dot: bool,
    },

    /// Start the web explorer
    Serve {
        /// Port for web server (default: from config, else 3000)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open browser automatically when starting web server
        #[arg(long)]
        no_open: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RenderTarget {
    /// The configured fuzzy graph
    Graph,
    /// The thresholded similarity tree
    Clusters,
}

fn parse_degree(text: &str) -> Result<f64, String> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|e| format!("invalid degree '{}': {}", text, e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("degree {} is outside [0, 1]", value))
    }
}

fn parse_vertex(text: &str) -> Result<(String, f64), String> {
    let (id, sigma) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ID=SIGMA, got '{}'", text))?;
    Ok((id.trim().to_string(), parse_degree(sigma)?))
}

fn parse_edge(text: &str) -> Result<Edge, String> {
    let (pair, mu) = text
        .split_once('=')
        .ok_or_else(|| format!("expected U:V=MU, got '{}'", text))?;
    let (u, v) = pair
        .split_once(':')
        .ok_or_else(|| format!("expected U:V=MU, got '{}'", text))?;
    Ok(Edge::new(u.trim(), v.trim(), parse_degree(mu)?))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // An explicit --config must exist; otherwise search from the working directory
    let config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            load_config(path)?
        }
        None => discover_config(&std::env::current_dir()?)?,
    };

    // Web mode owns the process until Ctrl+C
    if let Commands::Serve { port, no_open } = &cli.command {
        let renderer = detect_renderer(&config.renderer.graphviz_command);
        let server_config = ServerConfig {
            port: port.unwrap_or(config.server.port),
            open_browser: !no_open && config.server.open_browser,
        };

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(start_server(
            AppState::from_config(&config, renderer),
            server_config,
        ))
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

        return Ok(());
    }

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path)?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(stdout()),
    };
    let mut writer = output;

    execute(&cli, &config, &mut writer)?;
    writer.flush()?;

    if let Some(path) = &cli.output {
        eprintln!("Output written to: {}", path.display());
    }

    Ok(())
}

fn execute<W: Write>(
    cli: &Cli,
    config: &ExplorerConfig,
    writer: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::Membership { height } => {
            let report = MembershipReport::new(*height);
            if cli.json {
                write_json(&report, writer)?;
            } else {
                write_membership(&report, writer)?;
            }
        }

        Commands::Validate {
            vertices,
            edges,
            connectedness,
        } => {
            let graph = if vertices.is_empty() && edges.is_empty() {
                config.graph()
            } else {
                let mut graph = FuzzyGraph::new();
                for (id, sigma) in vertices {
                    graph.add_vertex(id.as_str(), *sigma);
                }
                graph.edges.extend(edges.iter().cloned());
                graph
            };

            let mut report = ValidationReport::new(graph)?;
            if let Some([from, to]) = connectedness.as_deref() {
                report = report.with_connectedness(from, to)?;
            }

            if cli.json {
                write_json(&report, writer)?;
            } else {
                write_validation(&report, writer)?;
            }
        }

        Commands::Cluster { threshold, forest } => {
            let edges = config.clustering.edges();
            if *forest {
                let forest = maximum_spanning_forest(&edges);
                if cli.json {
                    write_json(&forest, writer)?;
                } else {
                    write_forest(&forest, writer)?;
                }
            } else {
                let threshold = threshold.unwrap_or(config.clustering.threshold);
                let report = ClusteringReport::from(partition(&edges, threshold));
                if cli.json {
                    write_json(&report, writer)?;
                } else {
                    write_clustering(&report, writer)?;
                }
            }
        }

        Commands::Compose {
            support,
            opposition,
            abstention,
        } => {
            let builder = CompositionBuilder::new()
                .support(*support)?
                .opposition(*opposition)?
                .abstention(*abstention)?;
            let report = CompositionReport::new(&builder, builder.build()?);
            if cli.json {
                write_json(&report, writer)?;
            } else {
                write_composition(&report, writer)?;
            }
        }

        Commands::Render {
            target,
            threshold,
            dot,
        } => {
            let diagram = match target {
                RenderTarget::Graph => {
                    let graph = config.graph();
                    let violations = graph.validate()?;
                    Diagram::from_fuzzy_graph(&graph, &violations)
                }
                RenderTarget::Clusters => {
                    let threshold = threshold.unwrap_or(config.clustering.threshold);
                    Diagram::from_partition(&partition(&config.clustering.edges(), threshold))
                }
            };

            if *dot {
                write!(writer, "{}", diagram.to_dot())?;
                return Ok(());
            }

            let renderer = detect_renderer(&config.renderer.graphviz_command);
            info!(renderer = renderer.name(), "rendering diagram");
            let rendered = render_or_fallback(renderer.as_ref(), &diagram)?;
            if cli.json {
                write_json(&rendered, writer)?;
            } else {
                match rendered {
                    Rendered::Svg(svg) => write!(writer, "{}", svg)?,
                    Rendered::Instructions(text) => write!(writer, "{}", text)?,
                }
            }
        }

        Commands::Serve { .. } => return Err("serve does not produce a report".into()),
    }

    Ok(())
}
