//! `boneclone run`: one synchronisation pass over every provider.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use boneclone_core::config::{self, DEFAULT_CONFIG_FILE};
use boneclone_providers::{DefaultProviderFactory, ProviderFactory};
use boneclone_renderer::ChangeRequestRenderer;
use boneclone_sync::{pipeline, GitOperations, RunSummary, StrategyBuilder, UnitOutcome};

/// Arguments for `boneclone run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = config::load_at(&self.config)
            .with_context(|| format!("failed to load config {}", self.config.display()))?;
        let renderer = ChangeRequestRenderer::from_config(&config)
            .context("failed to load change request templates")?;
        let factory: Arc<dyn ProviderFactory> = Arc::new(DefaultProviderFactory::new());
        let strategy = StrategyBuilder::new()
            .operations(Arc::new(GitOperations::new()))
            .provider_factory(factory.clone())
            .renderer(Arc::new(renderer))
            .build(&config)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start tokio runtime")?;
        let summary = runtime.block_on(pipeline::run(Arc::new(config), factory, strategy, None));

        print_summary(&summary);
        Ok(())
    }
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "provider")]
    provider: String,
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_summary(summary: &RunSummary) {
    for skipped in &summary.skipped_providers {
        println!(
            "{} provider '{}' skipped: {}",
            "■".red().bold(),
            skipped.provider,
            skipped.reason
        );
    }

    if summary.units.is_empty() {
        println!("No repositories processed.");
        return;
    }

    let mut units: Vec<_> = summary.units.iter().collect();
    units.sort_by(|a, b| {
        (&a.provider, &a.repository.name).cmp(&(&b.provider, &b.repository.name))
    });
    let rows: Vec<UnitRow> = units
        .into_iter()
        .map(|unit| {
            let (result, detail) = match &unit.outcome {
                Ok(outcome) => (outcome_label(outcome), outcome_detail(outcome)),
                Err(e) => ("FAILED".red().bold().to_string(), e.clone()),
            };
            UnitRow {
                provider: unit.provider.clone(),
                repository: unit.repository.name.clone(),
                result,
                detail,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} repositories | {} failed",
        summary.units.len(),
        summary.failures()
    );
}

fn outcome_label(outcome: &UnitOutcome) -> String {
    let label = outcome.label().to_uppercase();
    match outcome {
        UnitOutcome::Pushed { .. } | UnitOutcome::ChangeRequestOpened { .. } => {
            label.green().bold().to_string()
        }
        UnitOutcome::UpToDate { .. } | UnitOutcome::NothingToPropose { .. } => {
            label.blue().to_string()
        }
        UnitOutcome::NotEligible => label.bright_black().to_string(),
    }
}

fn outcome_detail(outcome: &UnitOutcome) -> String {
    match outcome {
        UnitOutcome::NotEligible => String::new(),
        UnitOutcome::Pushed { branch, files } => format!("{} file(s) to {branch}", files.len()),
        UnitOutcome::UpToDate { branch } | UnitOutcome::NothingToPropose { branch } => {
            branch.clone()
        }
        UnitOutcome::ChangeRequestOpened { handle, .. } => handle.url.clone(),
    }
}
