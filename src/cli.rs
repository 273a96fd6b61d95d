use crate::config::{Config, LayoutMode, load_config};
use crate::dump::{VisibilityDump, write_dump};
use crate::layout::{compute_tick_visibility, compute_visibility};
use crate::parser::parse_timeline;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tlvis",
    version,
    about = "Compute zoom visibility intervals for timeline labels"
)]
pub struct Args {
    /// Timeline document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the JSON dump. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Also list the labels visible at this zoom factor
    #[arg(long = "at")]
    pub at: Option<f64>,

    /// Only compute this layout mode, e.g. "single" or "multi"
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<String>,

    /// Override the zoom range, e.g. --kmin 1 --kmax 32
    #[arg(long = "kmin")]
    pub k_min: Option<f64>,

    #[arg(long = "kmax")]
    pub k_max: Option<f64>,

    /// Estimate text widths instead of loading fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Trace sweep steps and row merges to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args)?;

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_timeline(&input)?;

    let table = compute_visibility(&parsed.labels, &parsed.scale, &config.declutter)
        .context("visibility computation failed")?;
    let ticks = compute_tick_visibility(
        &parsed.tick_levels,
        &parsed.scale,
        &config.ticks,
        config.declutter.k_min,
    );

    let dump = VisibilityDump::from_table(&table, &ticks, args.at);
    write_dump(&dump, args.output.as_deref())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_args(config: &mut Config, args: &Args) -> Result<()> {
    let declutter = &mut config.declutter;
    if let Some(k_min) = args.k_min {
        declutter.k_min = k_min;
    }
    if let Some(k_max) = args.k_max {
        declutter.k_max = k_max;
    }
    if args.fast_text {
        declutter.fast_text = true;
        config.ticks.fast_text = true;
    }
    if args.debug {
        declutter.debug = true;
    }
    if let Some(name) = args.mode.as_deref() {
        declutter.modes = vec![select_mode(&declutter.modes, name)?];
    }
    Ok(())
}

fn select_mode(modes: &[LayoutMode], name: &str) -> Result<LayoutMode> {
    modes
        .iter()
        .find(|mode| mode.name == name)
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = modes.iter().map(|mode| mode.name.as_str()).collect();
            anyhow::anyhow!("unknown mode `{}` (configured: {})", name, known.join(", "))
        })
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_config() {
        let args = Args::parse_from([
            "tlvis", "--kmin", "2", "--kmax", "16", "--mode", "multi", "--fastText",
        ]);
        let mut config = Config::default();
        apply_args(&mut config, &args).unwrap();
        assert_eq!(config.declutter.k_min, 2.0);
        assert_eq!(config.declutter.k_max, 16.0);
        assert_eq!(config.declutter.modes, vec![LayoutMode::multi()]);
        assert!(config.ticks.fast_text);
    }

    #[test]
    fn unknown_mode_is_reported() {
        let args = Args::parse_from(["tlvis", "--mode", "triple"]);
        let mut config = Config::default();
        let err = apply_args(&mut config, &args).unwrap_err();
        assert!(err.to_string().contains("triple"));
    }
}
