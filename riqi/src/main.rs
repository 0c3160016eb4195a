mod render;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Parser as _;
use render::{ColorMode, RenderOptions, Renderer};
use riqi_core::{Config, Parser};
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M";

/// riqi: pull dates, times and priorities out of Chinese task text
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Treat this moment as "now" (e.g. `--now "2024-01-10 08:00"`).
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,
    /// Print a single line per parse.
    #[arg(long, short)]
    short: bool,
    /// Reject impossible dates such as `2024-02-30` instead of falling back to today.
    #[arg(long, env = "RIQI_STRICT_DATES")]
    strict: bool,
    /// Control ANSI colors in output.
    /// By default, colors are disabled when output is redirected (e.g with `>` or `|`).
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
    /// Task text (e.g. `riqi 明天上午9点开会`). Read from stdin when omitted.
    text: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("riqi: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    config.strict_dates |= cli.strict;
    let parser = Parser::new(&config)?;
    debug!(?cli, strict = config.strict_dates, "parser ready");

    let renderer = Renderer::new(RenderOptions {
        date_format: config.date_format.clone(),
        time_format: config.time_format.clone(),
        use_color: cli.color.enabled(),
        short_mode: cli.short,
    });

    if !cli.text.is_empty() {
        let result = parser.parse(&cli.text.join(" "), cli.now)?;
        renderer.print_result(&result);
        return Ok(());
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading stdin")?;
    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let result = parser
            .parse(line, cli.now)
            .with_context(|| format!("parsing {line:?}"))?;
        renderer.print_result(&result);
    }
    Ok(())
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), NOW_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {e}"))
}
