//! wd - WasteDesk command-line entry point
//!
//! Every invocation opens the record store, runs one operation and closes it.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use kvstore::KvStore;
use tracing::{info, warn};

use wastedesk::auth::{AdminSession, Authenticator, Session, SessionKind, SessionStore};
use wastedesk::cli::{
    Cli, CollectorCommand, Command, LoginCommand, OutputFormat, RequestCommand, Role, ScheduleCommand,
};
use wastedesk::clock::{Clock, SystemClock};
use wastedesk::config::Config;
use wastedesk::domain::{Collector, IdResolver, NewCollector, NewRequest, NewScheduleEntry, Request, RequestStatus, ScheduleEntry};
use wastedesk::error::DeskError;
use wastedesk::export;
use wastedesk::lifecycle::RequestLifecycle;
use wastedesk::schedule::ScheduleManager;
use wastedesk::store::RecordStore;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wastedesk")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Log to file so command output stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("wastedesk.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store) = cli.store {
        config.storage.path = store;
    }
    config.validate().context("Invalid configuration")?;

    info!("WasteDesk using store at {}", config.storage.path.display());

    let desk = Desk::open(config)?;

    match cli.command {
        Command::Request { command } => cmd_request(&desk, command),
        Command::Collector { command } => cmd_collector(&desk, command),
        Command::Schedule { command } => cmd_schedule(&desk, command),
        Command::Stats { format } => cmd_stats(&desk, format),
        Command::Report { format } => cmd_report(&desk, format),
        Command::Export { output } => cmd_export(&desk, output),
        Command::Login { command } => cmd_login(&desk, command),
        Command::Logout { role } => cmd_logout(&desk, role),
        Command::Whoami => cmd_whoami(&desk),
    }
}

/// Shared handles for one invocation
struct Desk {
    config: Config,
    kv: KvStore,
    clock: SystemClock,
}

impl Desk {
    fn open(config: Config) -> Result<Self> {
        let kv = KvStore::open(&config.storage.path)
            .context(format!("Failed to open record store at {}", config.storage.path.display()))?;
        Ok(Self {
            config,
            kv,
            clock: SystemClock,
        })
    }

    fn records(&self) -> RecordStore {
        RecordStore::open(self.kv.clone())
    }

    fn sessions(&self) -> SessionStore {
        SessionStore::new(self.kv.clone())
    }

    fn lifecycle<'a>(&'a self, store: &'a mut RecordStore) -> RequestLifecycle<'a, SystemClock> {
        RequestLifecycle::new(store, &self.clock).with_strict_transitions(self.config.lifecycle.strict_transitions)
    }

    fn schedule<'a>(&'a self, store: &'a mut RecordStore) -> ScheduleManager<'a, SystemClock> {
        ScheduleManager::new(store, &self.clock).with_settings(self.config.schedule.settings())
    }

    fn require_admin(&self) -> Result<AdminSession> {
        self.sessions().current_admin().ok_or_else(|| {
            DeskError::Unauthorized("Admin login required (wd login admin <username> --password <password>)".to_string())
                .into()
        })
    }

    /// The logged-in collector, refreshed from the current crew
    fn require_collector(&self, store: &RecordStore) -> Result<Collector> {
        let session = self.sessions().current_collector().ok_or_else(|| {
            DeskError::Unauthorized("Collector login required (wd login collector <id> --password <password>)".to_string())
        })?;
        store
            .collector(&session.id)
            .cloned()
            .ok_or_else(|| DeskError::Unauthorized(format!("Collector {} no longer exists, log in again", session.id)).into())
    }
}

/// Persist and release the store, reporting any failed write
fn finish(store: RecordStore) {
    if !store.close() {
        warn!("Some collections could not be saved");
        eprintln!("{} Some records could not be saved, see the log for details", "!".yellow());
    }
}

fn resolve_id<'a>(kind: &'static str, ids: impl IntoIterator<Item = &'a str>, reference: &str) -> Result<String> {
    match IdResolver::new(ids).resolve(reference) {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(DeskError::not_found(kind, reference.trim()).into()),
        Err(candidates) => Err(eyre::eyre!(
            "Ambiguous {} id '{}', matches: {}",
            kind.to_lowercase(),
            reference.trim(),
            candidates.join(", ")
        )),
    }
}

fn request_id(store: &RecordStore, reference: &str) -> Result<String> {
    resolve_id("Request", store.requests().iter().map(|r| r.id.as_str()), reference)
}

fn schedule_id(store: &RecordStore, reference: &str) -> Result<String> {
    resolve_id("Schedule entry", store.schedules().iter().map(|s| s.id.as_str()), reference)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_label(status: RequestStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        RequestStatus::Pending => text.yellow(),
        RequestStatus::InProgress => text.blue(),
        RequestStatus::Completed => text.green(),
    }
}

fn collector_label(store: &RecordStore, collector: Option<&str>) -> String {
    collector
        .map(|id| store.collector_display(id))
        .unwrap_or_else(|| "Not assigned".to_string())
}

fn print_request(store: &RecordStore, request: &Request) {
    println!("{} {}", request.id.cyan(), status_label(request.status));
    println!("  Resident:   {} ({})", request.resident_name, request.resident_id);
    println!("  Waste:      {}, {} priority", request.waste_type, request.priority);
    println!("  Address:    {}", request.address);
    println!("  Phone:      {}", request.phone);
    if let Some(description) = &request.description {
        println!("  Details:    {}", description);
    }
    if let Some(date) = request.preferred_date {
        println!("  Preferred:  {}", date);
    }
    println!("  Submitted:  {}", request.timestamp.format("%Y-%m-%d %H:%M"));
    println!(
        "  Collector:  {}",
        collector_label(store, request.assigned_collector.as_deref())
    );
    if let Some(date) = request.collection_date {
        println!("  Collected:  {}", date);
    }
    if !request.notes.is_empty() {
        println!("  Notes:      {}", request.notes);
    }
}

fn print_requests(store: &RecordStore, requests: &[&Request], format: OutputFormat, empty: &str) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(requests)?,
        OutputFormat::Text if requests.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for request in requests {
                print_request(store, request);
            }
        }
    }
    Ok(())
}

fn print_schedule(store: &RecordStore, entries: &[&ScheduleEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entries)?,
        OutputFormat::Text if entries.is_empty() => println!("No schedule entries found"),
        OutputFormat::Text => {
            for entry in entries {
                println!(
                    "{}  {} {:<9} {}  {:<10} {:<13} {}",
                    entry.id.cyan(),
                    entry.date,
                    entry.day_name,
                    entry.time,
                    entry.area.to_string(),
                    entry.r#type.to_string(),
                    collector_label(store, entry.collector.as_deref())
                );
            }
        }
    }
    Ok(())
}

fn cmd_request(desk: &Desk, command: RequestCommand) -> Result<()> {
    let mut store = desk.records();

    match command {
        RequestCommand::Submit {
            resident_id,
            name,
            waste_type,
            priority,
            address,
            phone,
            description,
            preferred_date,
        } => {
            let request = desk.lifecycle(&mut store).submit(NewRequest {
                resident_id,
                resident_name: name,
                waste_type,
                priority,
                address,
                phone,
                description,
                preferred_date,
            })?;
            println!("{} Request submitted: {}", "✓".green(), request.id.cyan());
            println!("  Keep this id to track your request");
        }
        RequestCommand::Track { query, format } => {
            let lifecycle = desk.lifecycle(&mut store);
            let found = lifecycle.track(&query)?;
            print_requests(lifecycle.records(), &found, format, "No requests found")?;
        }
        RequestCommand::Show { id, format } => {
            let id = request_id(&store, &id)?;
            let lifecycle = desk.lifecycle(&mut store);
            let request = lifecycle.get(&id)?;
            print_requests(lifecycle.records(), &[request], format, "")?;
        }
        RequestCommand::List { limit, format } => {
            let limit = limit.unwrap_or(desk.config.lifecycle.recent_limit);
            let lifecycle = desk.lifecycle(&mut store);
            let recent = lifecycle.recent(limit);
            print_requests(lifecycle.records(), &recent, format, "No requests yet")?;
        }
        RequestCommand::Assign { id, collector } => {
            desk.require_admin()?;
            let id = request_id(&store, &id)?;
            let collector_id = desk.lifecycle(&mut store).assign(&id, &collector)?;
            println!(
                "{} {} assigned to {}",
                "✓".green(),
                id.cyan(),
                store.collector_display(&collector_id)
            );
        }
        RequestCommand::AssignAll => {
            desk.require_admin()?;
            let summary = desk.lifecycle(&mut store).auto_assign();
            if summary.unassigned_before == 0 {
                println!("No unassigned requests");
            } else if summary.assigned == 0 {
                println!("{} No active collectors available", "!".yellow());
            } else {
                println!(
                    "{} Assigned {} of {} unassigned requests",
                    "✓".green(),
                    summary.assigned,
                    summary.unassigned_before
                );
            }
        }
        RequestCommand::Status { id, status } => {
            let id = request_id(&store, &id)?;
            if desk.sessions().current_admin().is_none() {
                let collector = desk.require_collector(&store).map_err(|_| {
                    DeskError::Unauthorized("Admin or collector login required".to_string())
                })?;
                let assigned = store.request(&id).is_some_and(|r| r.is_assigned_to(&collector.id));
                if !assigned {
                    return Err(DeskError::Unauthorized(format!("Request {} is not assigned to you", id)).into());
                }
            }
            desk.lifecycle(&mut store).set_status(&id, status)?;
            println!("{} {} is now {}", "✓".green(), id.cyan(), status_label(status));
        }
        RequestCommand::Note { id, notes } => {
            desk.require_admin()?;
            let id = request_id(&store, &id)?;
            desk.lifecycle(&mut store).set_notes(&id, &notes)?;
            println!("{} Notes updated for {}", "✓".green(), id.cyan());
        }
    }

    finish(store);
    Ok(())
}

fn cmd_collector(desk: &Desk, command: CollectorCommand) -> Result<()> {
    let mut store = desk.records();

    match command {
        CollectorCommand::List { format } => match format {
            OutputFormat::Json => print_json(store.collectors())?,
            OutputFormat::Text => {
                for collector in store.collectors() {
                    let status = if collector.is_active() {
                        collector.status.to_string().green()
                    } else {
                        collector.status.to_string().dimmed()
                    };
                    println!(
                        "{}  {:<20} {:<14} {:<10} {}",
                        collector.id.cyan(),
                        collector.name,
                        collector.phone,
                        collector.area.to_string(),
                        status
                    );
                }
            }
        },
        CollectorCommand::Add {
            name,
            phone,
            area,
            status,
        } => {
            desk.require_admin()?;
            let collector = store.add_collector(NewCollector {
                name,
                phone,
                area,
                status,
            })?;
            println!("{} Collector added: {}", "✓".green(), collector.display_ref());
        }
        CollectorCommand::Rename { id, name } => {
            desk.require_admin()?;
            store.rename_collector(&id, &name)?;
            println!("{} Collector renamed: {}", "✓".green(), store.collector_display(&id));
        }
        CollectorCommand::Status { id, status } => {
            desk.require_admin()?;
            store.set_collector_status(&id, status)?;
            println!("{} {} is now {}", "✓".green(), store.collector_display(&id), status);
        }
        CollectorCommand::Remove { id } => {
            desk.require_admin()?;
            let removed = store.remove_collector(&id)?;
            println!("{} Collector removed: {}", "✓".green(), removed.display_ref());
        }
        CollectorCommand::Jobs { format } => {
            let collector = desk.require_collector(&store)?;
            let lifecycle = desk.lifecycle(&mut store);
            let jobs = lifecycle.assigned_to(&collector.id);
            if format == OutputFormat::Text {
                let stats = lifecycle.collector_stats(&collector.id);
                println!("{}", format!("Welcome, {}", collector.name).bold());
                println!(
                    "  Assigned: {}  Open: {}  Completed today: {}",
                    stats.assigned, stats.open, stats.completed_today
                );
                println!();
            }
            print_requests(lifecycle.records(), &jobs, format, "No requests assigned to you")?;
        }
    }

    finish(store);
    Ok(())
}

fn cmd_schedule(desk: &Desk, command: ScheduleCommand) -> Result<()> {
    let mut store = desk.records();

    match command {
        ScheduleCommand::List {
            area,
            waste_type,
            format,
        } => {
            let mut schedule = desk.schedule(&mut store);
            schedule.ensure_default();
            let entries = schedule.filter(area.as_deref(), waste_type);
            print_schedule(schedule.records(), &entries, format)?;
        }
        ScheduleCommand::Add {
            date,
            area,
            waste_type,
            time,
            collector,
        } => {
            desk.require_admin()?;
            let entry = desk.schedule(&mut store).add(NewScheduleEntry {
                date,
                area,
                r#type: waste_type,
                time,
                collector,
            })?;
            println!("{} Schedule entry added: {}", "✓".green(), entry.id.cyan());
        }
        ScheduleCommand::Edit { id, time, collector } => {
            desk.require_admin()?;
            if time.is_none() && collector.is_none() {
                return Err(eyre::eyre!("Nothing to change, pass --time and/or --collector"));
            }
            let id = schedule_id(&store, &id)?;
            let entry = desk
                .schedule(&mut store)
                .edit(&id, time.as_deref(), collector.as_deref())?;
            println!(
                "{} {} now at {} with {}",
                "✓".green(),
                entry.id.cyan(),
                entry.time,
                collector_label(&store, entry.collector.as_deref())
            );
        }
        ScheduleCommand::Remove { id } => {
            desk.require_admin()?;
            let id = schedule_id(&store, &id)?;
            let removed = desk.schedule(&mut store).remove(&id)?;
            println!(
                "{} Removed {} ({} {} {})",
                "✓".green(),
                removed.id.cyan(),
                removed.date,
                removed.time,
                removed.area
            );
        }
        ScheduleCommand::Today => {
            let collector = desk.require_collector(&store)?;
            let today = desk.clock.today();
            let schedule = desk.schedule(&mut store);
            let entries = schedule.for_collector_on(&collector.id, today);
            println!("{}", format!("Schedule for {} on {}", collector.name, today).bold());
            print_schedule(schedule.records(), &entries, OutputFormat::Text)?;
        }
        ScheduleCommand::Generate => {
            desk.require_admin()?;
            let generated = desk.schedule(&mut store).generate();
            println!("{} Generated {} schedule entries", "✓".green(), generated);
        }
    }

    finish(store);
    Ok(())
}

fn cmd_stats(desk: &Desk, format: OutputFormat) -> Result<()> {
    let mut store = desk.records();
    let stats = desk.lifecycle(&mut store).stats();

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => {
            println!("{}", "Request statistics".bold());
            println!("  Total requests:     {}", stats.total);
            println!("  Pending:            {}", stats.pending);
            println!("  In progress:        {}", stats.in_progress);
            println!("  Completed:          {}", stats.completed);
            println!("  Completed today:    {}", stats.completed_today);
            println!("  Residents:          {}", stats.residents);
            println!(
                "  Active collectors:  {} of {}",
                stats.active_collectors, stats.total_collectors
            );
        }
    }

    finish(store);
    Ok(())
}

fn cmd_report(desk: &Desk, format: OutputFormat) -> Result<()> {
    desk.require_admin()?;
    let mut store = desk.records();
    let report = desk.lifecycle(&mut store).report();

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print!("{}", report),
    }

    finish(store);
    Ok(())
}

fn cmd_export(desk: &Desk, output: Option<PathBuf>) -> Result<()> {
    desk.require_admin()?;
    let store = desk.records();
    let bundle = export::export_bundle(&store, &desk.clock);
    let path = output.unwrap_or_else(|| PathBuf::from(export::default_file_name(desk.clock.today())));

    export::write_bundle(&bundle, &path)?;
    println!(
        "{} Exported {} requests, {} collectors, {} schedule entries to {}",
        "✓".green(),
        bundle.requests.len(),
        bundle.collectors.len(),
        bundle.schedules.len(),
        path.display()
    );

    finish(store);
    Ok(())
}

fn cmd_login(desk: &Desk, command: LoginCommand) -> Result<()> {
    let credentials = desk.config.auth.credentials();
    let sessions = desk.sessions();

    let (name, saved) = match command {
        LoginCommand::Admin { username, password } => {
            let admin = credentials.login_admin(&username, &password)?;
            let name = admin.name.clone();
            (name, sessions.begin(&Session::Admin(admin)))
        }
        LoginCommand::Collector { id, password } => {
            let store = desk.records();
            let collector = credentials.login_collector(&id, &password, store.collectors())?;
            let name = collector.name.clone();
            let saved = sessions.begin(&Session::Collector(collector));
            finish(store);
            (name, saved)
        }
    };

    if !saved {
        warn!("Login accepted but the session could not be saved");
        eprintln!(
            "{} Credentials accepted for {}, but the session could not be saved, see the log for details",
            "!".yellow(),
            name
        );
        return Ok(());
    }
    println!("{} Login successful! Welcome, {}", "✓".green(), name);
    Ok(())
}

fn cmd_logout(desk: &Desk, role: Option<Role>) -> Result<()> {
    let sessions = desk.sessions();
    let kinds: &[SessionKind] = match role {
        Some(Role::Admin) => &[SessionKind::Admin],
        Some(Role::Collector) => &[SessionKind::Collector],
        None => &[SessionKind::Admin, SessionKind::Collector],
    };

    let mut ended = false;
    for kind in kinds {
        ended |= sessions.end(*kind).context("Failed to end session")?;
    }

    if ended {
        println!("{} Logged out", "✓".green());
    } else {
        println!("Not logged in");
    }
    Ok(())
}

fn cmd_whoami(desk: &Desk) -> Result<()> {
    let sessions = desk.sessions();
    let admin = sessions.current_admin();
    let collector = sessions.current_collector();

    if let Some(admin) = &admin {
        println!("Admin: {} ({})", admin.name, admin.username.cyan());
    }
    if let Some(collector) = &collector {
        println!("Collector: {}", collector.display_ref().cyan());
    }
    if admin.is_none() && collector.is_none() {
        println!("Not logged in");
    }
    Ok(())
}
