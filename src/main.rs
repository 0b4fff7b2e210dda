use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use docketgate::clock::SystemClock;
use docketgate::config::Config;
use docketgate::conflict::{courtroom_density, group_by_date, max_severity, Conflict};
use docketgate::hearing::{parse_date, CaseId, HearingForm};
use docketgate::{
    dlog, Actor, Error, Gateway, GatewayResponse, HearingRequest, HearingStore, JsonFileStore,
    Result,
};

/// docketgate - hearing conflict detection and override resolution
#[derive(Parser, Debug)]
#[command(name = "docketgate")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:
    DOCKETGATE_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.docketgate/docketgate.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Schedule file to use instead of the configured one
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show conflicts a hearing would have, without booking it
    Check {
        /// Hearing form as JSON, or @path to a JSON file
        #[arg(long)]
        form: String,
    },

    /// Book a hearing through the gateway
    Submit {
        /// Hearing form as JSON, or @path to a JSON file
        #[arg(long)]
        form: String,

        /// Book despite conflicts (requires --reason)
        #[arg(long = "override")]
        override_requested: bool,

        /// Justification recorded with the override
        #[arg(long)]
        reason: Option<String>,

        /// Who is booking
        #[arg(long, default_value = "cli")]
        actor: String,

        /// Display name for the actor
        #[arg(long)]
        actor_name: Option<String>,
    },

    /// List stored hearings
    List {
        /// Only hearings on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// List override audit records
    Overrides {
        /// Only records for this case
        #[arg(long = "case")]
        case_id: Option<String>,
    },

    /// Show same-courtroom density warnings for a date
    Density {
        /// Date to inspect (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    docketgate::log::init_with_debug(cli.debug);
    let config = Config::load()?;
    if !cli.debug {
        if let Some(level) = config.effective_log_level()? {
            docketgate::log::set_level(level);
        }
    }

    dlog!("docketgate command: {:?}", cli.command);
    let store = Arc::new(config.open_store(cli.store.as_deref())?);

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Command::Check { form } => rt.block_on(run_check(&config, store, &form)),
        Command::Submit {
            form,
            override_requested,
            reason,
            actor,
            actor_name,
        } => {
            let actor = Actor::new(actor, actor_name.unwrap_or_default());
            let code = rt.block_on(run_submit(
                &config,
                store,
                &form,
                override_requested,
                reason,
                actor,
            ))?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Command::List { date } => rt.block_on(run_list(store, date.as_deref())),
        Command::Overrides { case_id } => rt.block_on(run_overrides(store, case_id.as_deref())),
        Command::Density { date } => rt.block_on(run_density(&config, store, &date)),
        Command::Config => run_config(&config, cli.store.as_deref()),
    }
}

fn build_gateway(config: &Config, store: Arc<JsonFileStore>) -> Result<Gateway> {
    Ok(Gateway::new(
        store,
        config.detector()?,
        Arc::new(config.registry()),
        Arc::new(SystemClock),
    )
    .with_allow_past_dates(config.allow_past_dates))
}

/// Inline JSON, or `@path` to read it from a file.
fn read_form(raw: &str) -> Result<HearingForm> {
    let json = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)?,
        None => raw.to_string(),
    };
    Ok(serde_json::from_str(&json)?)
}

async fn run_check(config: &Config, store: Arc<JsonFileStore>, form: &str) -> Result<()> {
    let gateway = build_gateway(config, store)?;
    let conflicts = gateway.check(&read_form(form)?).await?;
    if conflicts.is_empty() {
        println!("No conflicts.");
        return Ok(());
    }
    print_conflicts(&conflicts);
    Ok(())
}

async fn run_submit(
    config: &Config,
    store: Arc<JsonFileStore>,
    form: &str,
    override_requested: bool,
    reason: Option<String>,
    actor: Actor,
) -> Result<i32> {
    let gateway = build_gateway(config, store)?;
    let mut request = HearingRequest::new(read_form(form)?, actor);
    request.override_requested = override_requested;
    request.override_reason = reason;

    let response = GatewayResponse::from_result(gateway.submit(request).await);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.exit_code())
}

async fn run_list(store: Arc<JsonFileStore>, date: Option<&str>) -> Result<()> {
    let date: Option<NaiveDate> = date.map(parse_date).transpose()?;
    let mut hearings = store.schedule().await?;
    hearings.retain(|h| date.map_or(true, |d| h.date == d));
    hearings.sort_by(|a, b| (a.date, a.time, &a.case_id).cmp(&(b.date, b.time, &b.case_id)));

    if hearings.is_empty() {
        println!("No hearings.");
        return Ok(());
    }
    println!(
        "{:<12} {:<6} {:<16} {:<24} {:<24} {:<10}",
        "DATE", "TIME", "CASE", "CLIENT", "COURT", "STATUS"
    );
    for h in &hearings {
        println!(
            "{:<12} {:<6} {:<16} {:<24} {:<24} {:<10}",
            h.date.to_string(),
            h.time.format("%H:%M").to_string(),
            truncate_string(h.case_id.as_str(), 16),
            truncate_string(&h.client_name, 24),
            truncate_string(&h.court_name, 24),
            h.status.to_string()
        );
    }
    Ok(())
}

async fn run_overrides(store: Arc<JsonFileStore>, case_id: Option<&str>) -> Result<()> {
    let case_id = case_id.map(CaseId::new).transpose()?;
    if let Some(id) = &case_id {
        if store.find(id).await?.is_none() {
            return Err(Error::HearingNotFound(id.to_string()));
        }
    }
    let records = store.override_records(case_id.as_ref()).await?;
    if records.is_empty() {
        println!("No override records.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  case {}  by {}  at {}",
            record.id().short(),
            record.case_id(),
            record.actor(),
            record.recorded_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  reason: {}", record.reason());
        for conflict in record.conflicts() {
            println!("  - [{}] {}", conflict.severity, conflict.message);
        }
    }
    Ok(())
}

async fn run_density(config: &Config, store: Arc<JsonFileStore>, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let detector = config.detector()?;
    let hearings = store.schedule().await?;
    let warnings = courtroom_density(detector.classifier(), &hearings, date);
    if warnings.is_empty() {
        println!("No busy courtrooms on {}.", date);
        return Ok(());
    }
    for warning in &warnings {
        let cases: Vec<&str> = warning.case_ids.iter().map(CaseId::as_str).collect();
        println!(
            "{}: {} hearings between {} and {} ({})",
            warning.court_name,
            warning.case_ids.len(),
            warning.first_start.format("%H:%M"),
            warning.last_start.format("%H:%M"),
            cases.join(", ")
        );
    }
    Ok(())
}

fn run_config(config: &Config, store_override: Option<&Path>) -> Result<()> {
    println!("# {}", Config::config_path()?.display());
    let store_path = match store_override {
        Some(path) => path.to_path_buf(),
        None => config.effective_store_path()?,
    };
    println!("# store: {}", store_path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn print_conflicts(conflicts: &[Conflict]) {
    if let Some(worst) = max_severity(conflicts) {
        println!("{} conflict(s), highest severity {}", conflicts.len(), worst);
    }
    let groups = group_by_date(conflicts);
    for (date, dated) in &groups.dated {
        println!("{}:", date);
        for conflict in dated {
            println!("  [{}] {}", conflict.severity, conflict.message);
        }
    }
    if !groups.general.is_empty() {
        println!("General:");
        for conflict in &groups.general {
            println!("  [{}] {}", conflict.severity, conflict.message);
        }
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", truncated)
}
