//! `cat-core` CLI: a reference command-line driver over the session engine.
//!
//! Session state is never held in a running process across invocations —
//! each command reads a JSON response log from disk, replays it through
//! `SessionEngine::replay` to reconstruct the session, applies whatever new
//! operation was requested, and writes the log back out. This mirrors how a
//! stateless request handler would use this crate: the log on disk plays
//! the role a persistence collaborator would otherwise fill.

use cat_common::{ItemId, OutputFormat, SessionId, UserId};
use cat_core::{InMemoryItemPool, Item, ItemProvider, PersistedResponse, SelectorInput, SessionEngine};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cat-core")]
#[command(author, version, about = "Adaptive testing session engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a `cat-config` JSON file; falls back to env/XDG/defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results.
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate calibration readiness of an item bank.
    Readiness {
        /// Path to a JSON array of calibrated items.
        #[arg(long)]
        bank: PathBuf,
    },

    /// Start a new session and persist its response log.
    Begin {
        #[arg(long)]
        bank: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        prior_theta: Option<f64>,
        /// Seed for the item selector's randomesque sampling.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Where to persist the session's response log.
        #[arg(long)]
        session_file: PathBuf,
    },

    /// Submit a graded response and advance the session.
    Submit {
        #[arg(long)]
        bank: PathBuf,
        #[arg(long)]
        session_file: PathBuf,
        #[arg(long)]
        item: String,
        #[arg(long)]
        correct: bool,
        #[arg(long)]
        time_spent: Option<f64>,
    },

    /// Print a session's progress without revealing its ability estimate.
    Progress {
        #[arg(long)]
        bank: PathBuf,
        #[arg(long)]
        session_file: PathBuf,
    },
}

/// The on-disk shape of a session's replay log: everything `replay` needs,
/// plus the selector seed so item selection stays reproducible across
/// invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionLog {
    session_id: SessionId,
    user_id: UserId,
    prior_theta: f64,
    seed: u64,
    responses: Vec<PersistedResponse>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cat_core=info")))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let config = match cat_config::resolve(cli.config.as_deref()) {
        Ok((config, _source)) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Readiness { bank } => run_readiness(&bank, &config, cli.format),
        Commands::Begin {
            bank,
            user,
            prior_theta,
            seed,
            session_file,
        } => run_begin(&bank, &config, &user, prior_theta, seed, &session_file, cli.format),
        Commands::Submit {
            bank,
            session_file,
            item,
            correct,
            time_spent,
        } => run_submit(&bank, &config, &session_file, &item, correct, time_spent, cli.format),
        Commands::Progress { bank, session_file } => run_progress(&bank, &config, &session_file, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_bank(path: &Path) -> Result<Vec<Item>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
}

fn load_session_log(path: &Path) -> Result<SessionLog, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
}

fn save_session_log(path: &Path, log: &SessionLog) -> Result<(), String> {
    let text = serde_json::to_string_pretty(log).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| format!("writing {}: {e}", path.display()))
}

fn print_value(value: &serde_json::Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Md => println!("```json\n{}\n```", serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Summary => println!("{value}"),
    }
}

fn run_readiness(bank: &Path, config: &cat_config::CatConfig, format: OutputFormat) -> Result<(), String> {
    let items = load_bank(bank)?;
    let report = cat_core::evaluate_readiness(&items, config);
    print_value(&serde_json::to_value(&report).map_err(|e| e.to_string())?, format);
    Ok(())
}

fn run_begin(
    bank: &Path,
    config: &cat_config::CatConfig,
    user: &str,
    prior_theta: Option<f64>,
    seed: u64,
    session_file: &Path,
    format: OutputFormat,
) -> Result<(), String> {
    let items = load_bank(bank)?;
    let pool = InMemoryItemPool::new(items);
    let user_id = UserId::from(user.to_string());
    let prior_theta = prior_theta.unwrap_or(0.0);
    let session_id = SessionId::new();

    let engine = SessionEngine::new(config);
    let session = engine.initialize(session_id.clone(), user_id.clone(), prior_theta);

    let mut rng = StdRng::seed_from_u64(seed);
    let empty_administered = std::collections::HashSet::new();
    let eligible = pool.list_eligible_for_user(&user_id);
    let first_item = cat_core::select_next_item(
        &eligible,
        &SelectorInput {
            theta: session.theta,
            administered: &empty_administered,
            domain_coverage: &session.domain_coverage,
            domain_weights: &config.domain_weights,
            min_items_per_domain: config.min_items_per_domain,
            randomesque_k: config.randomesque_k,
        },
        &mut rng,
    );

    let log = SessionLog {
        session_id: session_id.clone(),
        user_id,
        prior_theta,
        seed,
        responses: Vec::new(),
    };
    save_session_log(session_file, &log)?;

    tracing::info!(session_id = %session_id, "session started via CLI");

    print_value(
        &serde_json::json!({
            "session_id": session_id,
            "first_item": first_item,
            "theta": session.theta,
            "theta_se": session.theta_se,
        }),
        format,
    );
    Ok(())
}

fn run_submit(
    bank: &Path,
    config: &cat_config::CatConfig,
    session_file: &Path,
    item_id: &str,
    correct: bool,
    time_spent: Option<f64>,
    format: OutputFormat,
) -> Result<(), String> {
    let items = load_bank(bank)?;
    let pool = InMemoryItemPool::new(items);
    let mut log = load_session_log(session_file)?;

    let engine = SessionEngine::new(config);
    let mut session = engine
        .replay(log.session_id.clone(), log.user_id.clone(), log.prior_theta, &log.responses, &pool)
        .map_err(|e| e.to_string())?;

    let item_id = ItemId::from(item_id.to_string());
    let item = pool.get_by_id(&item_id);
    let (domain, a, b) = match &item {
        Some(item) => (Some(item.domain), Some(item.discrimination), Some(item.difficulty)),
        None => (None, None, None),
    };

    let step = engine
        .process_response(&mut session, item_id.clone(), correct, domain, a, b, time_spent)
        .map_err(|e| e.to_string())?;

    log.responses.push(PersistedResponse {
        item_id,
        correct,
        time_spent,
    });
    save_session_log(session_file, &log)?;

    if step.should_stop {
        let reason = step.reason.expect("should_stop implies a stop reason");
        let final_result = engine.finalize(&mut session, reason).map_err(|e| e.to_string())?;
        let score = cat_core::score_session(final_result.theta, final_result.theta_se, 0.95, config.reliability_floor);
        print_value(
            &serde_json::json!({
                "completed": true,
                "theta": final_result.theta,
                "theta_se": final_result.theta_se,
                "items_administered": final_result.items_administered,
                "domain_scores": final_result.domain_scores,
                "stop_reason": reason,
                "score": score,
            }),
            format,
        );
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(log.seed.wrapping_add(log.responses.len() as u64));
    let administered = session.administered_id_set();
    let eligible = pool.list_eligible_for_user(&session.user_id);
    let next_item = cat_core::select_next_item(
        &eligible,
        &SelectorInput {
            theta: session.theta,
            administered: &administered,
            domain_coverage: &session.domain_coverage,
            domain_weights: &config.domain_weights,
            min_items_per_domain: config.min_items_per_domain,
            randomesque_k: config.randomesque_k,
        },
        &mut rng,
    );

    print_value(
        &serde_json::json!({
            "completed": false,
            "next_item": next_item,
            "theta": step.theta,
            "theta_se": step.theta_se,
            "items_administered": step.items_administered,
        }),
        format,
    );
    Ok(())
}

fn run_progress(bank: &Path, config: &cat_config::CatConfig, session_file: &Path, format: OutputFormat) -> Result<(), String> {
    let items = load_bank(bank)?;
    let pool = InMemoryItemPool::new(items);
    let log = load_session_log(session_file)?;

    let engine = SessionEngine::new(config);
    let session = engine
        .replay(log.session_id.clone(), log.user_id.clone(), log.prior_theta, &log.responses, &pool)
        .map_err(|e| e.to_string())?;

    let elapsed: f64 = session.administered.iter().filter_map(|r| r.time_spent).sum();
    print_value(
        &serde_json::json!({
            "items_administered": session.administered.len(),
            "items_max": config.max_items,
            "domain_coverage": session.domain_coverage,
            "current_se": session.theta_se,
            "elapsed": elapsed,
        }),
        format,
    );
    Ok(())
}
