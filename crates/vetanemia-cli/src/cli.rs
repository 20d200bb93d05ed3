use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vetanemia")]
#[command(about = "VetAnemia dashboard in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and VETANEMIA_URL env var)
    #[arg(short, long, global = true, env = "VETANEMIA_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "VETANEMIA_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log requests and session activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login(LoginArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Summary figures and recent cases
    Dashboard,
    /// Run an anemia risk prediction
    Predict(Box<PredictArgs>),
    /// Browse case history
    Cases(CasesArgs),
    /// AI clinical suggestions
    Suggestions(SuggestionsArgs),
    /// View or edit your profile
    Profile(ProfileArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,
    /// Password
    #[arg(long, env = "VETANEMIA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct PredictArgs {
    /// Read the whole form from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["patient_name", "hemoglobin"])]
    pub file: Option<PathBuf>,

    /// Save the result to the case history
    #[arg(long)]
    pub save: bool,

    #[arg(long)]
    pub patient_name: Option<String>,
    #[arg(long, default_value = "")]
    pub species: String,
    #[arg(long, default_value = "")]
    pub breed: String,
    /// Age in years
    #[arg(long, default_value = "")]
    pub age: String,
    /// Body weight in kg
    #[arg(long, default_value = "")]
    pub weight: String,
    #[arg(long, default_value = "")]
    pub gender: String,
    #[arg(long, default_value = "")]
    pub symptoms: String,

    /// Hemoglobin (g/dL)
    #[arg(long, alias = "hb")]
    pub hemoglobin: Option<String>,
    /// Hematocrit / PCV (%)
    #[arg(long, alias = "pcv", default_value = "")]
    pub hematocrit: String,
    /// Red blood cells / TEC (10^6/µL)
    #[arg(long, alias = "rbc", default_value = "")]
    pub red_blood_cells: String,
    #[arg(long, default_value = "")]
    pub mcv: String,
    #[arg(long, default_value = "")]
    pub mch: String,
    #[arg(long, default_value = "")]
    pub mchc: String,
    #[arg(long, default_value = "")]
    pub tlc: String,
    #[arg(long, default_value = "")]
    pub platelet: String,
    #[arg(long, default_value = "")]
    pub reticulocyte: String,
    #[arg(long, default_value = "")]
    pub bun: String,
    #[arg(long, default_value = "")]
    pub creatinine: String,
    #[arg(long, default_value = "")]
    pub alt: String,
    #[arg(long, default_value = "")]
    pub ast: String,
    #[arg(long, default_value = "")]
    pub glucose: String,
}

#[derive(clap::Args)]
pub struct CasesArgs {
    #[command(subcommand)]
    pub command: CasesCommands,
}

#[derive(Subcommand)]
pub enum CasesCommands {
    /// List cases with statistics
    List(CaseListArgs),
    /// Show one case in full
    Show(CaseShowArgs),
}

#[derive(clap::Args)]
pub struct CaseListArgs {
    /// Search patient name, owner or breed
    #[arg(long, default_value = "")]
    pub search: String,
    /// Risk level filter (all, low, medium, high)
    #[arg(long, default_value = "all")]
    pub risk: String,
    /// Status filter (all, completed, pending, ...)
    #[arg(long, default_value = "all")]
    pub status: String,
}

#[derive(clap::Args)]
pub struct CaseShowArgs {
    /// Case id
    pub id: String,
}

#[derive(clap::Args)]
pub struct SuggestionsArgs {
    #[command(subcommand)]
    pub command: SuggestionsCommands,
}

#[derive(Subcommand)]
pub enum SuggestionsCommands {
    /// Suggestion statistics
    Stats,
    /// Generate suggestions for a case or the last prediction
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Case id (defaults to the last prediction)
    #[arg(long)]
    pub case: Option<String>,
    /// Only this type (diagnostic, treatment, monitoring, preventive)
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Only this priority (high, medium, low)
    #[arg(long)]
    pub priority: Option<String>,
    /// Show every suggestion instead of the first few
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,
    /// Update profile fields
    Update(ProfileUpdateArgs),
}

#[derive(clap::Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub clinic_id: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format)
    pub key: String,
    /// Value
    pub value: String,
}
