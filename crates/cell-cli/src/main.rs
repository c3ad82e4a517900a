//! cell CLI - AutoMod cell file inspector
//!
//! Decodes cell files and reports their structure, definitions and warnings.

use anyhow::{Context, Result};
use cell_loader::{CellError, CellLoader, DecodeOptions, ErrorKind, Node, Scene, Shape};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cell")]
#[command(about = "Inspect AutoMod cell files", long_about = None)]
struct Cli {
    /// TOML file with decode options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a cell file
    Info {
        /// Path to the cell file
        file: PathBuf,
    },
    /// Print the node hierarchy
    Tree {
        /// Path to the cell file
        file: PathBuf,
    },
    /// Print the decoded scene as JSON
    Dump {
        /// Path to the cell file
        file: PathBuf,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a cell file
    Check {
        /// Path to the cell file
        file: PathBuf,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { file } => show_info(&file, options)?,
        Commands::Tree { file } => show_tree(&file, options)?,
        Commands::Dump { file, pretty } => dump(&file, options, pretty)?,
        Commands::Check { file, strict } => check(&file, options, strict)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<DecodeOptions> {
    let Some(path) = config else {
        return Ok(DecodeOptions::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    DecodeOptions::from_toml_str(&source)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn load(file: &Path, options: DecodeOptions) -> Result<Scene> {
    CellLoader::new()
        .with_options(options)
        .load_path(file)
        .with_context(|| format!("decoding {}", file.display()))
}

fn show_info(file: &Path, options: DecodeOptions) -> Result<()> {
    let scene = load(file, options)?;

    println!("cell file: {}", file.display());
    println!("  Root: {:?} ({})", scene.root.cell_type, scene.root.name());
    println!("  Nodes: {}", scene.node_count());
    println!("  Definitions: {}", scene.definitions.len());
    println!("  Warnings: {}", scene.warnings.len());

    if !scene.definitions.is_empty() {
        println!("\nDefinitions:");
        for name in scene.definitions.names() {
            if let Some(node) = scene.definitions.get(name) {
                println!("  {}: {:?}", name, node.cell_type);
            }
        }
    }

    if !scene.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &scene.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}

fn show_tree(file: &Path, options: DecodeOptions) -> Result<()> {
    let scene = load(file, options)?;
    scene.root.walk(&mut |node, depth| {
        println!("{}{}", "  ".repeat(depth), describe(node));
    });
    Ok(())
}

fn describe(node: &Node) -> String {
    let mut line = format!("{:?} {}", node.cell_type, node.name());
    match &node.shape {
        Shape::Instance(instance) => line.push_str(&format!(" -> {}", instance.reference)),
        Shape::FileReference { path } | Shape::CompiledPicture { path } => {
            line.push_str(&format!(" [{}]", path));
        }
        Shape::Container { children } => line.push_str(&format!(" ({} children)", children.len())),
        _ => {}
    }
    line
}

fn dump(file: &Path, options: DecodeOptions, pretty: bool) -> Result<()> {
    let scene = load(file, options)?;
    let json = if pretty {
        serde_json::to_string_pretty(&scene)?
    } else {
        serde_json::to_string(&scene)?
    };
    println!("{}", json);
    Ok(())
}

fn check(file: &Path, mut options: DecodeOptions, strict: bool) -> Result<()> {
    options.warnings_as_errors |= strict;
    let result = CellLoader::new().with_options(options).load_path(file);
    match result {
        Ok(scene) => {
            for warning in &scene.warnings {
                println!("warning: {}", warning);
            }
            println!(
                "{}: ok ({} nodes, {} warnings)",
                file.display(),
                scene.node_count(),
                scene.warnings.len()
            );
            Ok(())
        }
        Err(err) => anyhow::bail!("{}: {}: {}", file.display(), tier(&err), err),
    }
}

fn tier(err: &CellError) -> &'static str {
    match err.kind() {
        ErrorKind::MalformedStream => "incorrect format",
        ErrorKind::Semantic => "parsing error",
        ErrorKind::Cancelled => "cancelled",
    }
}
