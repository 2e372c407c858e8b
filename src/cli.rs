use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::resource::EntityKind;

#[derive(Parser)]
#[command(name = "kevel")]
#[command(version)]
#[command(about = "Reconcile Kevel ad-serving inventory with a declared configuration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Desired-state file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// State file (defaults to kevel.state.json next to the config)
    #[arg(long, global = true)]
    pub state: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "KEVEL_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// API key
    #[arg(long, global = true, env = "KEVEL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Create, update and delete remote objects to match the configuration
    Apply(ApplyArgs),

    /// Delete every tracked object
    Destroy(DestroyArgs),

    /// Track an existing remote object under a local name
    Import(ImportArgs),

    /// Re-read tracked objects and record drift in state
    Refresh {
        /// Only refresh `kind` or `kind.name`
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Print tracked state
    Show {
        /// Only show `kind` or `kind.name`
        target: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Only plan `kind` or `kind.name`
    #[arg(short, long)]
    pub target: Option<String>,

    /// Refresh tracked objects before planning
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Only apply `kind` or `kind.name`
    #[arg(short, long)]
    pub target: Option<String>,

    /// Refresh tracked objects before planning
    #[arg(long)]
    pub refresh: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run - show the plan without applying it
    #[arg(short, long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Only destroy `kind` or `kind.name`
    #[arg(short, long)]
    pub target: Option<String>,

    /// Destroy without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Kind of object to import
    #[arg(value_enum)]
    pub kind: EntityKind,

    /// Local name to track it under
    pub name: String,

    /// Remote id (`channel:site` for channel site maps)
    pub id: String,
}
