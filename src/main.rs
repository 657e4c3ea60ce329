//! Skill gap analyzer: taxonomy-driven skill extraction and gap reporting

mod cli;
mod config;
mod error;
mod output;
mod processing;
mod taxonomy;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction, TaxonomyAction};
use config::{Config, OutputFormat};
use error::{Result, SkillGapError};
use log::{error, info};
use output::formatter::ReportFormatter;
use processing::extractor::SkillExtractor;
use processing::normalizer;
use processing::reconciler::{self, ReconcilePolicy};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use taxonomy::TaxonomyStore;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config) {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            taxonomy,
            threshold,
            output,
            save,
            detailed,
        } => run_analyze(
            config, resume, job, taxonomy, threshold, output, save, detailed,
        ),

        Commands::Taxonomy { action } => run_taxonomy(action),

        Commands::Config { action } => run_config(action, config),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    config: Config,
    resume: PathBuf,
    job: PathBuf,
    taxonomy: PathBuf,
    threshold: Option<f32>,
    output: Option<String>,
    save: Option<PathBuf>,
    detailed: bool,
) -> Result<()> {
    cli::validate_file_extension(&resume, &["txt", "md"])
        .map_err(|e| SkillGapError::InvalidInput(format!("Resume file: {}", e)))?;
    cli::validate_file_extension(&job, &["txt", "md"])
        .map_err(|e| SkillGapError::InvalidInput(format!("Job description file: {}", e)))?;

    let output_format = match output {
        Some(format) => {
            cli::parse_output_format(&format).map_err(SkillGapError::InvalidInput)?
        }
        None => config.output.format,
    };

    info!("Loading taxonomy from {}", taxonomy.display());
    let store = Arc::new(TaxonomyStore::load(&taxonomy)?);
    info!(
        "Taxonomy {} loaded: {} skills, {} aliases",
        store.version(),
        store.len(),
        store.alias_count()
    );

    let resume_text = std::fs::read_to_string(&resume)?;
    let job_text = std::fs::read_to_string(&job)?;

    let extractor = SkillExtractor::new(&config.extraction)?;

    // The two documents share nothing but the read-only store, so they
    // extract in parallel.
    let (resume_skills, job_result) = std::thread::scope(|scope| {
        let job_store = Arc::clone(&store);
        let job_handle = scope.spawn({
            let job_text = &job_text;
            let extractor = &extractor;
            move || extractor.extract(job_text, &job_store)
        });
        let resume_skills = extractor.extract(&resume_text, &store);
        (resume_skills, job_handle.join())
    });
    let job_skills = match job_result {
        Ok(skills) => skills,
        Err(panic) => std::panic::resume_unwind(panic),
    };

    info!(
        "Extracted {} resume skills, {} required skills",
        resume_skills.len(),
        job_skills.len()
    );

    let policy = ReconcilePolicy::new(threshold.unwrap_or(config.reconcile.match_threshold))?;
    let report = reconciler::reconcile(&resume_skills, &job_skills, &policy, &store)?;

    let use_color = config.output.color_output && output_format == OutputFormat::Console;
    let formatter = ReportFormatter::new(use_color);
    let rendered = if (detailed || config.output.detailed) && output_format == OutputFormat::Console
    {
        formatter.format_console_with_evidence(&report, &resume_skills, &resume_text)
    } else {
        formatter.format(&report, &output_format)?
    };
    println!("{}", rendered);

    if let Some(path) = save {
        let plain = ReportFormatter::new(false).format(&report, &output_format)?;
        std::fs::write(&path, plain)?;
        info!("Report saved to {}", path.display());
    }

    Ok(())
}

fn run_taxonomy(action: TaxonomyAction) -> Result<()> {
    match action {
        TaxonomyAction::Validate { taxonomy } => {
            let store = TaxonomyStore::load(&taxonomy)?;
            println!(
                "Catalog {} is valid: {} skills, {} aliases (version {})",
                taxonomy.display(),
                store.len(),
                store.alias_count(),
                store.version()
            );
            Ok(())
        }

        TaxonomyAction::Info { taxonomy } => {
            let store = TaxonomyStore::load(&taxonomy)?;
            println!("Version: {}", store.version());
            println!("Skills: {}", store.len());
            println!("Aliases: {}", store.alias_count());

            let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
            for entity in store.entities() {
                *by_category.entry(entity.category.to_string()).or_insert(0) += 1;
            }
            println!("Categories:");
            for (category, count) in by_category {
                println!("  {:<16} {}", category, count);
            }

            if let Some((alias, entity)) = store.aliases_by_length().next() {
                println!("Longest alias: '{}' ({})", alias, entity.display_name);
            }
            Ok(())
        }

        TaxonomyAction::Lookup { taxonomy, phrase } => {
            let store = TaxonomyStore::load(&taxonomy)?;
            let normalized = normalizer::normalize_phrase(&phrase);
            match store.lookup(&normalized) {
                Some(entity) => {
                    println!(
                        "'{}' -> {} [{}] (id: {})",
                        phrase, entity.display_name, entity.category, entity.id
                    );
                }
                None => {
                    println!("'{}' (normalized: '{}') has no taxonomy entry", phrase, normalized);
                }
            }
            Ok(())
        }
    }
}

fn run_config(action: Option<ConfigAction>, config: Config) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            let content = toml::to_string_pretty(&config).map_err(|e| {
                SkillGapError::Configuration(format!("Failed to serialize config: {}", e))
            })?;
            println!("{}", content);
            Ok(())
        }

        Some(ConfigAction::Reset) => {
            let defaults = Config::default();
            defaults.save()?;
            println!("Configuration reset to defaults");
            Ok(())
        }

        Some(ConfigAction::Set { key, value }) => {
            let mut config = config;
            config.set_value(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
            Ok(())
        }
    }
}
