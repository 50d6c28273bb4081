//! Phat Nguoi CLI - traffic violation operations from command line
//!
//! Usage:
//! ```bash
//! phatnguoi init
//! phatnguoi seed
//! phatnguoi --token tok-officer-1 violation list --status pending
//! phatnguoi --token tok-officer-1 violation process 12 --decision processed --notes "confirmed"
//! phatnguoi --token tok-officer-1 violation quick-process 1 2 3 --action approve
//! phatnguoi lookup --plate 51A-123
//! phatnguoi --token tok-authority report --kind camera-efficiency --days 30 --format markdown
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use phatnguoi_core::{CameraStatus, Role, ViolationStatus};
use std::path::PathBuf;

mod commands;
mod db;

use commands::{admin, report, violation};

/// Phat Nguoi - traffic violation review workflow over SQLite
#[derive(Parser)]
#[command(name = "phatnguoi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/phatnguoi.db", global = true)]
    pub db: PathBuf,

    /// Acting credential (api token); omit for public lookup
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database with schema
    Init {
        /// Remove existing database first
        #[arg(long)]
        force: bool,
    },

    /// Seed demo users and cameras
    Seed,

    /// Show database status
    Status,

    /// Violation operations
    Violation {
        #[command(subcommand)]
        action: ViolationAction,
    },

    /// Public lookup by license plate or violation code (no token needed)
    Lookup {
        /// License plate (substring match)
        #[arg(long)]
        plate: Option<String>,
        /// Violation code (exact match)
        #[arg(long)]
        code: Option<String>,
    },

    /// User management (authority only)
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Camera management
    Camera {
        #[command(subcommand)]
        action: CameraAction,
    },

    /// Generate reports
    Report {
        /// Report type
        #[arg(long, default_value = "statistics")]
        kind: ReportKind,
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
        /// Output format
        #[arg(long, default_value = "markdown")]
        format: ReportFormat,
        /// Output file path (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ViolationAction {
    /// List violations with filters (officer/authority)
    List {
        #[arg(long)]
        status: Option<StatusArg>,
        /// License plate substring
        #[arg(long)]
        plate: Option<String>,
        /// Violation type substring
        #[arg(long = "type")]
        violation_type: Option<String>,
        /// From date (RFC3339 or YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// To date (RFC3339 or YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },

    /// Show one violation
    Show {
        violation_id: i64,
    },

    /// Record a camera-detected violation (officer/authority)
    Create {
        #[arg(long)]
        plate: String,
        #[arg(long = "type")]
        violation_type: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        camera_id: i64,
        /// Fine amount in VND
        #[arg(long)]
        fine: rust_decimal::Decimal,
        /// Violation time (RFC3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
    },

    /// File a citizen report (fine is set later by the authority)
    Report {
        #[arg(long)]
        plate: String,
        #[arg(long = "type")]
        violation_type: String,
        #[arg(long)]
        location: String,
        /// Violation time (RFC3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Evidence URLs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        evidence: Option<Vec<String>>,
    },

    /// Process a pending violation
    Process {
        violation_id: i64,
        /// Decision: processed or rejected (default processed)
        #[arg(long)]
        decision: Option<DecisionArg>,
        #[arg(long)]
        notes: Option<String>,
        /// Set the fine while processing
        #[arg(long)]
        fine: Option<rust_decimal::Decimal>,
    },

    /// Record payment of a processed violation
    Pay {
        violation_id: i64,
    },

    /// Record an appeal against a processed violation
    Appeal {
        violation_id: i64,
    },

    /// Bulk-process violations with a uniform action
    QuickProcess {
        violation_ids: Vec<i64>,
        #[arg(long)]
        action: BulkActionArg,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List my own reports (citizen)
    Mine {
        #[arg(long)]
        status: Option<StatusArg>,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    List,
    /// List officers
    Officers,
    /// Create a user
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: RoleArg,
        #[arg(long)]
        phone: Option<String>,
        /// Credential for this user
        #[arg(long)]
        api_token: Option<String>,
        #[arg(long)]
        citizen_id: Option<String>,
        #[arg(long)]
        badge: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Update a user profile (role is immutable)
    Update {
        user_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Deactivate a user
    Deactivate {
        user_id: i64,
    },
}

#[derive(Subcommand)]
pub enum CameraAction {
    /// List cameras
    List {
        #[arg(long)]
        status: Option<CameraStatusArg>,
        #[arg(long = "type")]
        camera_type: Option<String>,
    },
    /// Show one camera
    Show {
        camera_id: i64,
    },
    /// Register a camera (authority only)
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long = "type")]
        camera_type: String,
        #[arg(long)]
        latitude: Option<f64>,
        #[arg(long)]
        longitude: Option<f64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change camera status (authority only)
    SetStatus {
        camera_id: i64,
        status: CameraStatusArg,
    },
    /// Delete a camera (authority only)
    Delete {
        camera_id: i64,
    },
}

// === Value enums ===

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Processed,
    Paid,
    Rejected,
    Appealed,
}

impl StatusArg {
    pub fn to_core(self) -> ViolationStatus {
        match self {
            StatusArg::Pending => ViolationStatus::Pending,
            StatusArg::Processed => ViolationStatus::Processed,
            StatusArg::Paid => ViolationStatus::Paid,
            StatusArg::Rejected => ViolationStatus::Rejected,
            StatusArg::Appealed => ViolationStatus::Appealed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DecisionArg {
    Processed,
    Rejected,
}

impl DecisionArg {
    pub fn to_core(self) -> ViolationStatus {
        match self {
            DecisionArg::Processed => ViolationStatus::Processed,
            DecisionArg::Rejected => ViolationStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BulkActionArg {
    Approve,
    Reject,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Citizen,
    Officer,
    Authority,
}

impl RoleArg {
    pub fn to_core(self) -> Role {
        match self {
            RoleArg::Citizen => Role::Citizen,
            RoleArg::Officer => Role::Officer,
            RoleArg::Authority => Role::Authority,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CameraStatusArg {
    Active,
    Inactive,
    Maintenance,
}

impl CameraStatusArg {
    pub fn to_core(self) -> CameraStatus {
        match self {
            CameraStatusArg::Active => CameraStatus::Active,
            CameraStatusArg::Inactive => CameraStatus::Inactive,
            CameraStatusArg::Maintenance => CameraStatus::Maintenance,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Statistics,
    Dashboard,
    Performance,
    CameraEfficiency,
    Trends,
    MyReports,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => db::init_database(&cli.db, force).await?,
        Commands::Seed => db::seed_demo_data(&cli.db).await?,
        Commands::Status => db::show_status(&cli.db).await?,
        Commands::Violation { action } => {
            violation::handle(&cli.db, cli.token.as_deref(), action).await?
        }
        Commands::Lookup { plate, code } => {
            violation::lookup(&cli.db, plate.as_deref(), code.as_deref()).await?
        }
        Commands::User { action } => admin::handle_user(&cli.db, cli.token.as_deref(), action).await?,
        Commands::Camera { action } => {
            admin::handle_camera(&cli.db, cli.token.as_deref(), action).await?
        }
        Commands::Report {
            kind,
            days,
            format,
            output,
        } => report::handle(&cli.db, cli.token.as_deref(), kind, days, format, output).await?,
    }

    Ok(())
}
