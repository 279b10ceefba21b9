use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use gitstr_parse::{config, input, report, scan};

/// gitstr-parse — reads captured Nostr events and lists the git repository
/// announcements and patches they contain, with their naddr/nevent addresses.
#[derive(Parser, Debug)]
#[command(name = "gitstr-parse", version, about)]
struct Cli {
    /// Events file: a JSON array or one event per line. Reads stdin when
    /// omitted or `-`.
    input: Option<PathBuf>,

    /// Relay the events were fetched from; repeat for several
    #[arg(long = "relay", value_name = "URL")]
    relays: Vec<String>,

    /// Optional output file path for markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use a built-in event capture for demo purposes
    #[arg(long)]
    r#mock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;
    if !config.output.color {
        colored::control::set_override(false);
    }
    let source_relays = config.source_relays(&cli.relays);
    debug!(relays = ?source_relays, "source relays");

    let events = if cli.r#mock {
        info!("using mock event capture for demo");
        input::parse_events(include_str!("../tests/fixtures/events.jsonl"))?
    } else {
        let _span = info_span!("load", input = ?cli.input).entered();
        input::load(cli.input.as_deref())?
    };
    info!(events = events.len(), "loaded events");

    let scanned = scan::scan(&events, &source_relays);
    info!(
        repos = scanned.repos.len(),
        patches = scanned.patches.len(),
        rejected = scanned.rejected,
        "parsing complete"
    );

    info!("generating report");
    let built_report = report::build(&scanned);
    report::output(&built_report, cli.output.as_deref())?;
    info!("done");

    Ok(())
}
