mod config;
mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::GauntletConfig;
use crate::error::RunError;
use crate::input::run_log::render_run_log;
use crate::input::{InputError, RunLog, read_answer_key, read_run_log};
use crate::model::gold::{GoldEntity, parse_fill};
use crate::model::tally::Tier;
use crate::model::taxonomy::SlotKind;
use crate::pipeline::stage1_align::align_clusters;
use crate::pipeline::stage4_match::{match_gold, matches, normalize_guess};
use crate::pipeline::stage6_gauntlet::{GauntletInputs, run_gauntlet};
use crate::report::json::render_gauntlet_json;
use crate::report::text::{render_alignment, render_gauntlet_text};

const REPORT_TEXT: &str = "gauntlet.txt";
const REPORT_JSON: &str = "gauntlet.json";

/// Grid search over cluster selection settings for template extraction runs.
#[derive(Debug, Parser)]
#[command(name = "template-gauntlet", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate every grid point and report the best cluster per template type.
    Gauntlet(GauntletArgs),
    /// Print the greedy alignment of the run log's cluster inventory to its topics.
    Align {
        #[arg(long)]
        log: PathBuf,
        /// Also print the inventory records, truncated to this many tokens.
        #[arg(long)]
        records: Option<usize>,
    },
    /// Check one guess against a gold fill such as `"URBAN GUERRILLAS" / "FMLN"`.
    Match {
        #[arg(long)]
        fill: String,
        #[arg(long)]
        guess: String,
    },
}

#[derive(Debug, Args)]
struct GauntletArgs {
    #[arg(long)]
    log: PathBuf,
    #[arg(long)]
    key: PathBuf,
    /// JSON grid config; flags below override its fields.
    #[arg(long)]
    grid: Option<PathBuf>,
    #[arg(long, value_delimiter = ',')]
    top_doc: Vec<usize>,
    #[arg(long, value_delimiter = ',')]
    top_sent: Vec<usize>,
    /// Confidence cutoffs; `off` disables the channel for that grid point.
    #[arg(long, value_delimiter = ',')]
    cutoff: Vec<CutoffArg>,
    #[arg(long, value_delimiter = ',')]
    lambda: Vec<f64>,
    #[arg(long = "type", value_delimiter = ',')]
    template_types: Vec<String>,
    #[arg(long, value_delimiter = ',', value_parser = parse_slot)]
    slots: Vec<SlotKind>,
    #[arg(long, value_parser = parse_tier)]
    rank_tier: Option<Tier>,
    #[arg(long)]
    parallel: bool,
    /// Directory for gauntlet.txt and gauntlet.json.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CutoffArg(Option<f64>);

impl FromStr for CutoffArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            return Ok(CutoffArg(None));
        }
        s.parse::<f64>()
            .map(|v| CutoffArg(Some(v)))
            .map_err(|_| format!("invalid cutoff '{s}' (expected a number or 'off')"))
    }
}

fn parse_slot(s: &str) -> Result<SlotKind, String> {
    SlotKind::parse(s).ok_or_else(|| format!("unknown slot '{s}'"))
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    Tier::all()
        .iter()
        .copied()
        .find(|t| t.name() == s)
        .ok_or_else(|| format!("unknown tier '{s}' (strict, all-guessed, full-domain)"))
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), RunError> {
    match command {
        Command::Gauntlet(args) => run_gauntlet_command(args),
        Command::Align { log, records } => {
            let log = read_run_log(&log)?;
            let alignment = align_clusters(&log.clusters, &log.topics);
            print!("{}", render_alignment(&alignment));
            if let Some(max_tokens) = records {
                let inventory = RunLog {
                    clusters: log.clusters,
                    topics: log.topics,
                    stories: Vec::new(),
                };
                print!("{}", render_run_log(&inventory, max_tokens));
            }
            Ok(())
        }
        Command::Match { fill, guess } => {
            let (mentions, optional) = parse_fill(&fill)
                .ok_or_else(|| InputError::InvalidInput(format!("empty gold fill '{fill}'")))?;
            let entity = GoldEntity::new("", mentions, optional);
            let verdict = match_gold(&entity, &guess);
            println!("guess: {}", normalize_guess(&guess));
            println!("mentions:");
            for mention in &entity.mentions {
                let alone = GoldEntity::new("", [mention.as_str()], optional);
                println!("  {mention}: {}", matches(&alone, &guess));
            }
            println!("verdict: {verdict:?}");
            Ok(())
        }
    }
}

fn run_gauntlet_command(args: GauntletArgs) -> Result<(), RunError> {
    let config = resolve_config(&args)?;
    let log = read_run_log(&args.log)?;
    let key = read_answer_key(&args.key)?;

    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    let text = render_gauntlet_text(&reports, &log.clusters, config.max_record_tokens);

    match &args.out {
        Some(dir) => {
            let json = render_gauntlet_json(&config, &reports)?;
            write_report(dir, REPORT_TEXT, &text)?;
            write_report(dir, REPORT_JSON, &json)?;
            info!(out = %dir.display(), grid_points = reports.len(), "reports written");
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Grid file (or defaults) with command-line overrides applied, validated.
fn resolve_config(args: &GauntletArgs) -> Result<GauntletConfig, RunError> {
    let mut config = match &args.grid {
        Some(path) => GauntletConfig::load(path)?,
        None => GauntletConfig::default(),
    };
    if !args.top_doc.is_empty() {
        config.top_doc = args.top_doc.clone();
    }
    if !args.top_sent.is_empty() {
        config.top_sent = args.top_sent.clone();
    }
    if !args.cutoff.is_empty() {
        config.cutoffs = args.cutoff.iter().map(|c| c.0).collect();
    }
    if !args.lambda.is_empty() {
        config.lambdas = args.lambda.clone();
    }
    if !args.template_types.is_empty() {
        config.template_types = args.template_types.clone();
    }
    if !args.slots.is_empty() {
        config.slots = args.slots.clone();
    }
    if let Some(tier) = args.rank_tier {
        config.rank_tier = tier;
    }
    config.parallel |= args.parallel;
    config.canonicalize_types()?;
    config.validate()?;
    Ok(config)
}

fn write_report(dir: &Path, name: &str, body: &str) -> Result<(), RunError> {
    let path = dir.join(name);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, body))
        .map_err(|source| RunError::Output {
            path: path.display().to_string(),
            source,
        })
}
