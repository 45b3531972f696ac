use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "policyguard", version, about = "PolicyGuard compliance console")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Backend base URL (overrides config file and POLICYGUARD_API_URL)"
    )]
    pub api_url: Option<String>,
    #[arg(long, global = true, help = "Path to config.toml")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account on the backend
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "POLICYGUARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and keep the session token locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "POLICYGUARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the local session token
    Logout,
    /// Show whether a session is held and the available views
    Session,
    /// Aggregated compliance metrics
    Dashboard {
        #[arg(long)]
        scan_id: Option<i64>,
    },
    /// Past scan runs
    History,
    /// Risk analysis overview
    Risk,
    Violations {
        #[command(subcommand)]
        command: ViolationCommands,
    },
    /// Submit a policy document plus one data source for scanning
    Scan {
        #[arg(long)]
        policy: Option<PathBuf>,
        #[arg(long)]
        db_uri: Option<String>,
        #[arg(long)]
        data_file: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = false,
            help = "Refuse requests that carry both --db-uri and --data-file"
        )]
        exclusive: bool,
    },
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
    /// Download the compliance report PDF
    Report {
        #[arg(long)]
        scan_id: Option<i64>,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ViolationCommands {
    List {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Resolve one or more open violations concurrently
    Resolve {
        #[arg(required = true)]
        ids: Vec<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    Show,
    Set {
        #[arg(long)]
        auto_scan: Option<bool>,
        #[arg(long, allow_negative_numbers = true)]
        interval: Option<i64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Resolved,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Open => "open",
            StatusFilter::Resolved => "resolved",
        }
    }
}
