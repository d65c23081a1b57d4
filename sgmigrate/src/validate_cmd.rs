use anyhow::{bail, Context, Result};
use colored::Colorize;
use sgmigrate::load::{load_context, LoadError};
use sgmigrate::report::render_validation_errors;
use sgmigrate::settings::load_settings;

use crate::cli::{OutputFormat, ValidateArgs};

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref()).context("failed to load settings")?;
    match load_context(&args.inputs, settings.parse_options()) {
        Ok(_) => {
            match args.format {
                OutputFormat::Text => {
                    for input in &args.inputs {
                        println!("{} {}", "valid".green(), input.display());
                    }
                }
                OutputFormat::Json => println!("[]"),
            }
            Ok(())
        }
        Err(LoadError::Invalid(errors)) => {
            match args.format {
                OutputFormat::Text => println!("{}", render_validation_errors(&errors)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&errors)?),
            }
            bail!("validation failed: {} input file(s) are invalid", errors.len());
        }
        Err(other) => Err(other.into()),
    }
}
