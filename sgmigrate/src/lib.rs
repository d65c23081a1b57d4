//! X-Pack to Search Guard security configuration migration.
//!
//! The source documents of an X-Pack cluster (`elasticsearch.yml` and the
//! security index exports of users, roles and role mappings) are parsed with
//! `config-trace`, so every value remembers where it came from. Migrators turn
//! the parsed values into Search Guard configuration files and report
//! everything that cannot be carried over exactly.
//!
//! # Architecture
//!
//! ## Source and target schemas
//!
//! - [`xpack`] — typed X-Pack documents: realms, TLS, users, roles, role mappings
//! - [`searchguard`] — typed Search Guard files, rendered to and read back from
//!   document trees
//!
//! ## Migration
//!
//! - [`migrate`] — the [`migrate::Migrator`] contract, the concrete migrators,
//!   the problem reporter and the intermediate representation that merges
//!   users, roles and role mappings of all migrators
//! - [`load`] — input files to a [`migrate::MigrationContext`]
//!
//! ## Messages and reporting
//!
//! - [`message`] — sentence composition for problem messages
//! - [`translate`] — `{KEY}` placeholder resolution against the message table
//! - [`report`] — colored terminal output and JSON rendering
//! - [`migration_summary`] — per-run entity counts
//! - [`settings`] — language, report title and default tracking
//!
//! # Workflow
//!
//! 1. **Load** the input files; validation errors of all files are reported
//!    together and stop the run
//! 2. **Migrate** the context with every migrator
//! 3. **Write** the target files and print the report
//!
//! # Examples
//!
//! ```ignore
//! use std::path::PathBuf;
//!
//! use sgmigrate::load::load_context;
//! use sgmigrate::migrate::{default_migrators, run_migration, MigrationReporter};
//! use sgmigrate::settings::load_settings;
//!
//! let settings = load_settings(None)?;
//! let context = load_context(&[PathBuf::from("elasticsearch.yml")], settings.parse_options())?;
//! let mut reporter = MigrationReporter::new(settings.build_translator()?);
//! let result = run_migration(&default_migrators(), &context, &mut reporter)?;
//! println!("{}", reporter.generate_report(&settings.report_title));
//! ```

pub mod load;
pub mod message;
pub mod migrate;
pub mod migration_summary;
pub mod report;
pub mod searchguard;
pub mod settings;
pub mod translate;
pub mod xpack;
