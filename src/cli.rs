use crate::config::load_config;
use crate::route_dump::write_route_dump;
use crate::scene::parse_scene;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spr", version, about = "Route connectors around rectangular obstacles")]
pub struct Args {
    /// Scene file (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the routed polylines. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Router config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Spacing override; takes precedence over the config file but not the scene
    #[arg(short = 's', long = "spacing")]
    pub spacing: Option<i32>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(spacing) = args.spacing {
        config.spacing = spacing;
    }

    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;
    let dump = scene.route(&config)?;
    write_route_dump(args.output.as_deref(), &dump, args.pretty)
        .context("failed to write routes")?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
