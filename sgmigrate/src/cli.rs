use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "sgmigrate")]
#[command(about = "Migrate X-Pack security configuration to Search Guard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Convert X-Pack files and write the Search Guard configuration.
    Migrate(MigrateArgs),
    /// Parse X-Pack files and report validation errors only.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// elasticsearch.yml, user.json, role.json and/or role_mapping.json.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(long, short = 'o', default_value = "sg_config")]
    pub output_dir: PathBuf,
    /// TOML file overriding the built-in settings.
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Language for report messages; overrides the settings file.
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Replace existing files in the output directory.
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(long)]
    pub settings: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
