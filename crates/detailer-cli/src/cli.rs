//! CLI definition using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use detailer_types::{OutputFormat, SimilarityMethod, VehicleClass};

#[derive(Parser)]
#[command(name = "detailer")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Vehicle detailing price estimation and pricing recommendations")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Identity to act as. Defaults to the current OS user.
    #[arg(long = "as", global = true, value_name = "SUBJECT")]
    pub subject: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Store directory override
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
}

/// Vehicle features shared by quoting and similarity search
#[derive(Args, Debug, Clone)]
pub struct VehicleArgs {
    /// Vehicle class
    #[arg(long, short = 'c')]
    pub class: VehicleClass,

    /// Interior condition (0 = worst, 100 = pristine)
    #[arg(long, short = 'i', allow_negative_numbers = true)]
    pub interior: i32,

    /// Exterior condition (0 = worst, 100 = pristine)
    #[arg(long, short = 'e', allow_negative_numbers = true)]
    pub exterior: i32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote a job with the current pricing model
    Quote {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Selected service key (repeatable)
        #[arg(long = "service", short = 's')]
        services: Vec<String>,

        /// Show how the price was built
        #[arg(long)]
        breakdown: bool,
    },

    /// Submit a self-assessment and lock in its estimate
    Submit {
        /// Client name
        #[arg(long)]
        client: String,

        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Image reference (repeatable, at least one)
        #[arg(long = "image", required = true)]
        images: Vec<String>,

        /// Selected service key (repeatable)
        #[arg(long = "service", short = 's')]
        services: Vec<String>,

        /// Free-form description of the vehicle
        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },

    /// Record the price actually charged for an assessment
    Feedback {
        /// Assessment id
        id: String,

        /// Actual price
        #[arg(long, short = 'a')]
        actual: f64,
    },

    /// Run the external vehicle analyzer on an assessment's photos
    Analyze {
        /// Assessment id
        id: String,
    },

    /// Show a single assessment
    Show {
        /// Assessment id
        id: String,
    },

    /// Show assessment history
    History {
        /// Only assessments of this owner
        #[arg(long)]
        owner: Option<String>,

        /// Only the calling identity's assessments
        #[arg(long, conflicts_with = "owner")]
        mine: bool,

        /// Only this vehicle class
        #[arg(long, short = 'c')]
        class: Option<VehicleClass>,

        /// Only assessments without an actual price
        #[arg(long)]
        pending: bool,

        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Manage the pricing model
    Model {
        #[command(subcommand)]
        action: ModelCommand,
    },

    /// Price adjustment suggestions from an owner's latest assessment
    Insights {
        /// Owner to analyze (defaults to the calling identity)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show estimate accuracy statistics
    Accuracy {
        /// Group by vehicle class
        #[arg(long)]
        by_class: bool,

        /// Show detailed per-sample breakdown
        #[arg(long)]
        detailed: bool,
    },

    /// Find comparable past assessments
    Similar {
        /// Compare against a stored assessment instead of explicit features
        #[arg(long, conflicts_with_all = ["class", "interior", "exterior"])]
        to: Option<String>,

        /// Vehicle class
        #[arg(long, short = 'c', required_unless_present = "to")]
        class: Option<VehicleClass>,

        /// Interior condition
        #[arg(long, short = 'i', required_unless_present = "to", allow_negative_numbers = true)]
        interior: Option<i32>,

        /// Exterior condition
        #[arg(long, short = 'e', required_unless_present = "to", allow_negative_numbers = true)]
        exterior: Option<i32>,

        /// Number of matches. Uses config value if not specified.
        #[arg(long, short = 'k')]
        limit: Option<usize>,

        /// Similarity strategy. Uses config value if not specified.
        #[arg(long)]
        strategy: Option<SimilarityMethod>,
    },

    /// Revenue, average order value and popular services
    Analytics {
        /// Trailing window in days. Uses config value if not specified.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Export assessments to CSV
    Export {
        /// Output CSV file path
        #[arg(long, short = 'o', default_value = "assessments.csv")]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set default similarity strategy
        #[arg(long)]
        set_strategy: Option<SimilarityMethod>,

        /// Set default number of similar assessments
        #[arg(long)]
        set_similar_limit: Option<usize>,

        /// Set analytics window in days
        #[arg(long)]
        set_window_days: Option<u32>,

        /// Grant the admin role to a subject
        #[arg(long)]
        add_admin: Option<String>,

        /// Revoke the admin role from a subject
        #[arg(long)]
        remove_admin: Option<String>,

        /// Grant the operator role to a subject
        #[arg(long)]
        add_operator: Option<String>,

        /// Set external analyzer command
        #[arg(long)]
        set_analyzer_cmd: Option<String>,

        /// Set analyzer timeout in seconds
        #[arg(long)]
        set_analyzer_timeout: Option<u64>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum ModelCommand {
    /// Show the current pricing model
    Show,

    /// Create the default pricing model if none exists
    Init,

    /// Replace the pricing model from a JSON or TOML file
    Set {
        /// Pricing model file (.json or .toml)
        #[arg(long)]
        file: PathBuf,

        /// Version the edit was based on, as shown by `model show`
        #[arg(long, required_unless_present = "create")]
        expected_version: Option<u64>,

        /// Assert that no model exists yet
        #[arg(long, conflicts_with = "expected_version")]
        create: bool,
    },
}
