use std::fs;

use anyhow::{bail, Context, Result};
use config_trace::write_file;
use sgmigrate::load::{load_context, LoadError};
use sgmigrate::migrate::{default_migrators, run_migration, MigrationReporter};
use sgmigrate::migration_summary::{render, summarize};
use sgmigrate::report::{render_json, render_migration_summary, render_validation_errors};
use sgmigrate::settings::load_settings;
use tracing::info;

use crate::cli::{MigrateArgs, OutputFormat};
use crate::path_guard::ensure_writable;

pub fn run_migrate(args: MigrateArgs) -> Result<()> {
    let mut settings = load_settings(args.settings.as_deref()).context("failed to load settings")?;
    if let Some(language) = args.language {
        settings.language = language;
    }

    let context = match load_context(&args.inputs, settings.parse_options()) {
        Ok(context) => context,
        Err(LoadError::Invalid(errors)) => {
            match args.format {
                OutputFormat::Text => println!("{}", render_validation_errors(&errors)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&errors)?),
            }
            bail!("validation failed: {} input file(s) are invalid", errors.len());
        }
        Err(other) => return Err(other.into()),
    };

    let translator = settings
        .build_translator()
        .context("failed to load translations")?;
    let mut reporter = MigrationReporter::new(translator);
    let result = run_migration(&default_migrators(), &context, &mut reporter)?;

    let targets: Vec<_> = result
        .configs
        .iter()
        .map(|config| (config, args.output_dir.join(config.file_name())))
        .collect();
    // Check every target before the first write.
    for (_, path) in &targets {
        ensure_writable(path, &args.inputs, args.force)?;
    }
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    for (config, path) in &targets {
        write_file(&config.to_doc(), path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote target file");
    }

    let summary = summarize(&result, &reporter);
    match args.format {
        OutputFormat::Text => {
            for (_, path) in &targets {
                println!("wrote {}", path.display());
            }
            if !reporter.is_empty() {
                println!("{}", reporter.generate_report(&settings.report_title));
            }
            println!("{}", render_migration_summary(&reporter, &settings.report_title));
            println!("{}", render(summary));
        }
        OutputFormat::Json => println!("{}", render_json(&summary, reporter.problems())?),
    }
    Ok(())
}
