use crate::config::{LayoutConfig, load_config};
use crate::ir::Workflow;
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "wflayout",
    version,
    about = "Auto-layout for workflow graphs (triggers, conditions, parallel branches, loops)"
)]
pub struct Args {
    /// Workflow JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config file (JSON5, camelCase keys)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Node id to pin on the anchor column
    #[arg(long = "root")]
    pub root: Option<String>,

    /// Anchor column for the primary root
    #[arg(long = "anchor-x", allow_negative_numbers = true)]
    pub anchor_x: Option<f32>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = resolve_config(&args)?;
    let input = read_input(args.input.as_deref())?;
    let workflow = Workflow::from_json(&input).context("reading workflow")?;
    log::info!(
        "laying out {} nodes and {} edges",
        workflow.nodes.len(),
        workflow.edges.len()
    );

    let layout = compute_layout(&workflow, &config);
    let dump = LayoutDump::from_layout(&layout, &workflow);
    write_layout_dump(args.output.as_deref(), &dump, !args.compact)?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    // Already initialised when run more than once in-process.
    let _ = builder.try_init();
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<LayoutConfig> {
    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;
    if let Some(root) = &args.root {
        config.root = Some(root.clone());
    }
    if let Some(anchor_x) = args.anchor_x {
        config.anchor_x = anchor_x;
    }
    config.validate()?;
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
