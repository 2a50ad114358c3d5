//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{CollectorStatus, Priority, RequestStatus, WasteType, Zone};

/// WasteDesk - waste-collection request desk
#[derive(Parser, Debug)]
#[command(
    name = "wd",
    author,
    version,
    about = "Waste-collection requests, collectors and pickup schedules",
    after_help = "Logs are written to: ~/.local/share/wastedesk/logs/wastedesk.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Record store directory (overrides storage.path)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit, track and manage collection requests
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },

    /// Manage the collection crew
    Collector {
        #[command(subcommand)]
        command: CollectorCommand,
    },

    /// View and edit the pickup schedule
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },

    /// Show request statistics
    Stats {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the summary report (admin)
    Report {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export all records as JSON (admin)
    Export {
        /// Output file (default: waste-collection-data-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log in as admin or collector
    Login {
        #[command(subcommand)]
        command: LoginCommand,
    },

    /// End the current session(s)
    Logout {
        /// Which session to end (default: both)
        #[arg(value_name = "ROLE")]
        role: Option<Role>,
    },

    /// Show who is logged in
    Whoami,
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Submit a new pickup request
    Submit {
        #[arg(long)]
        resident_id: String,

        #[arg(long)]
        name: String,

        /// Biodegradable, Recyclable or Hazardous
        #[arg(short = 't', long)]
        waste_type: WasteType,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(long)]
        address: String,

        #[arg(long)]
        phone: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Preferred pickup date (YYYY-MM-DD)
        #[arg(long)]
        preferred_date: Option<NaiveDate>,
    },

    /// Find requests by request id or resident id
    Track {
        query: String,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one request
    Show {
        id: String,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the most recent requests
    List {
        /// Number of rows (default: lifecycle.recent-limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Assign a request to an active collector by name or id (admin)
    Assign { id: String, collector: String },

    /// Assign every unassigned request to a random active collector (admin)
    AssignAll,

    /// Change a request's status (admin or collector)
    Status { id: String, status: RequestStatus },

    /// Replace a request's notes (admin)
    Note { id: String, notes: String },
}

#[derive(Subcommand, Debug)]
pub enum CollectorCommand {
    /// List collectors
    List {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a collector (admin)
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        /// North, South, East or West
        #[arg(short, long)]
        area: Zone,

        #[arg(long, default_value = "Active")]
        status: CollectorStatus,
    },

    /// Rename a collector (admin)
    Rename { id: String, name: String },

    /// Set a collector Active or Inactive (admin)
    Status { id: String, status: CollectorStatus },

    /// Remove a collector (admin)
    Remove { id: String },

    /// Requests assigned to the logged-in collector
    Jobs {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// List schedule entries, generating the default rotation on first use
    List {
        /// Zone name or part of it
        #[arg(short, long)]
        area: Option<String>,

        #[arg(short = 't', long = "type")]
        waste_type: Option<WasteType>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Add an entry (admin)
    Add {
        /// Pickup date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        #[arg(short, long)]
        area: Zone,

        #[arg(short = 't', long = "type")]
        waste_type: WasteType,

        /// Start time (HH:MM)
        #[arg(long)]
        time: String,

        /// Collector name or id
        #[arg(long)]
        collector: Option<String>,
    },

    /// Change an entry's time and/or collector (admin)
    Edit {
        id: String,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        collector: Option<String>,
    },

    /// Remove an entry (admin)
    Remove { id: String },

    /// Today's entries for the logged-in collector
    Today,

    /// Append a freshly generated rotation (admin)
    Generate,
}

#[derive(Subcommand, Debug)]
pub enum LoginCommand {
    /// Log in as the administrator
    Admin {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log in as a collector
    Collector {
        /// Collector id, e.g. C001
        id: String,

        #[arg(short, long)]
        password: String,
    },
}

/// Session role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Collector,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "collector" => Ok(Self::Collector),
            _ => Err(format!("Unknown role: {}. Use: admin or collector", s)),
        }
    }
}

/// Output format for listing commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_submit() {
        let cli = Cli::parse_from([
            "wd",
            "request",
            "submit",
            "--resident-id",
            "R1",
            "--name",
            "Dana",
            "-t",
            "hazardous",
            "--address",
            "4 Oak Ave",
            "--phone",
            "555",
        ]);
        if let Command::Request {
            command: RequestCommand::Submit {
                waste_type, priority, ..
            },
        } = cli.command
        {
            assert_eq!(waste_type, WasteType::Hazardous);
            assert_eq!(priority, Priority::Medium);
        } else {
            panic!("Expected request submit");
        }
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["wd", "request", "status", "REQ1", "in-progress"]);
        assert!(matches!(
            cli.command,
            Command::Request {
                command: RequestCommand::Status {
                    status: RequestStatus::InProgress,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_cli_parse_schedule_filters() {
        let cli = Cli::parse_from(["wd", "schedule", "list", "--area", "north", "--type", "recyclable"]);
        if let Command::Schedule {
            command: ScheduleCommand::List { area, waste_type, format },
        } = cli.command
        {
            assert_eq!(area.as_deref(), Some("north"));
            assert_eq!(waste_type, Some(WasteType::Recyclable));
            assert_eq!(format, OutputFormat::Text);
        } else {
            panic!("Expected schedule list");
        }
    }

    #[test]
    fn test_cli_global_store() {
        let cli = Cli::parse_from(["wd", "stats", "--store", "/tmp/desk", "-f", "json"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/desk")));
        assert!(matches!(cli.command, Command::Stats { format: OutputFormat::Json }));
    }

    #[test]
    fn test_cli_rejects_bad_zone() {
        let result = Cli::try_parse_from(["wd", "collector", "add", "--name", "A", "--phone", "1", "--area", "Mars"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
        assert_eq!("Collector".parse::<Role>(), Ok(Role::Collector));
    }
}
