//! The `gotcha` run: configuration, registry, scans, report.

use crate::cli::Cli;
use crate::targets;
use anyhow::{Context, Result};
use gotcha_core::{AppConfig, Identifier};
use gotcha_platform::{PlatformLoader, PlatformRegistry};
use gotcha_report::{render, save_report, ReportFormat, ReportOptions};
use gotcha_scanner::{
    DomainAnalyzer, ProbeExecutor, ScanCoordinator, ScanError, ScanRequest, ScanResult,
};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How a run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every target was scanned and reported
    Completed,
    /// Every probe of every scan failed; the report is still written
    Exhausted,
    /// Interrupted by the user; a report is only written if it was already underway
    Interrupted,
}

/// Layer configuration: file, then environment, then flags.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    let mut config = config.with_env_overrides();

    if let Some(threads) = cli.threads {
        config.scanning.concurrency_limit = threads as usize;
    }
    if let Some(timeout) = cli.timeout {
        config.scanning.timeout_secs = timeout;
    }
    if let Some(dir) = &cli.definitions {
        config.platforms.extra_definitions_dir = Some(dir.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Built-in catalog plus any configured extra definitions.
pub fn load_registry(config: &AppConfig) -> Result<PlatformRegistry> {
    let registry = PlatformRegistry::builtin().context("failed to load built-in platforms")?;

    match &config.platforms.extra_definitions_dir {
        Some(dir) => {
            let loader = PlatformLoader::new(dir)?;
            registry
                .with_extra(&loader)
                .with_context(|| format!("failed to load platforms from {}", dir.display()))
        }
        None => Ok(registry),
    }
}

fn report_format(cli: &Cli, config: &AppConfig) -> Result<ReportFormat> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    if let Some(format) = cli.output.as_deref().and_then(ReportFormat::from_path) {
        return Ok(format);
    }
    config
        .output
        .format
        .parse()
        .context("invalid output.format in configuration")
}

/// Print the catalog, grouped by category.
pub fn list_platforms(cli: &Cli, registry: &PlatformRegistry) -> Result<()> {
    let mut categories = cli.categories();
    if categories.is_empty() {
        categories = gotcha_core::Category::ALL.into_iter().collect();
    }

    let mut stdout = std::io::stdout().lock();
    for category in &categories {
        let platforms: Vec<_> = registry
            .all()
            .iter()
            .filter(|p| p.category() == *category)
            .collect();
        if platforms.is_empty() {
            continue;
        }

        writeln!(stdout, "\n[ {} ] ({})", category.display_name(), platforms.len())?;
        for platform in platforms {
            writeln!(
                stdout,
                "  {:<22} {:<26} {:<8}{}",
                platform.id().to_string(),
                platform.name(),
                platform.accepts.to_string(),
                if platform.adult { " 18+" } else { "" }
            )?;
        }
    }
    writeln!(stdout, "\n{} platforms", registry.len())?;
    Ok(())
}

/// Scan every target, then write or print the report.
///
/// Ctrl-C is honoured until the report is out; a report being written when it
/// arrives is finished first.
pub async fn scan(cli: &Cli, config: &AppConfig, registry: PlatformRegistry) -> Result<Outcome> {
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling scan");
                cancel.cancel();
            }
        })
    };

    let outcome = scan_and_report(cli, config, registry, &cancel).await;
    interrupt.abort();
    outcome
}

async fn scan_and_report(
    cli: &Cli,
    config: &AppConfig,
    registry: PlatformRegistry,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let targets = targets::collect(
        cli.username.as_deref(),
        cli.email.as_deref(),
        cli.file.as_deref(),
    )?;
    if targets.is_empty() {
        anyhow::bail!("no valid targets to scan");
    }

    let format = report_format(cli, config)?;
    let executor = ProbeExecutor::http(&config.scanning).context("failed to set up HTTP client")?;
    let coordinator = ScanCoordinator::new(Arc::new(registry), Arc::new(executor));
    let request = ScanRequest::new(cli.categories())
        .with_config(&config.scanning)
        .with_include_adult(cli.include_adult());
    let probe_platforms = !request.categories.is_empty();
    let analyzer = cli
        .analyze_domain()
        .then(|| DomainAnalyzer::dns(config.scanning.timeout()));

    let mut results: Vec<ScanResult> = Vec::with_capacity(targets.len());
    for target in &targets {
        let scanned = if probe_platforms {
            match coordinator.scan_with_cancel(target, &request, cancel).await {
                Ok(result) => Some(result),
                Err(ScanError::Cancelled) => return Ok(Outcome::Interrupted),
                Err(ScanError::NoPlatformsSelected { kind }) => {
                    warn!(%target, %kind, "no selected platform accepts this target, skipping");
                    None
                }
                Err(e) => return Err(e).with_context(|| format!("scan of {target} failed")),
            }
        } else {
            None
        };

        let domain = match (&analyzer, target) {
            (Some(analyzer), Identifier::Email(email)) => tokio::select! {
                () = cancel.cancelled() => return Ok(Outcome::Interrupted),
                report = analyzer.analyze(email) => Some(report),
            },
            (Some(_), Identifier::Username(_)) if !probe_platforms => {
                warn!(%target, "domain analysis needs an email address, skipping");
                None
            }
            _ => None,
        };

        match (scanned, domain) {
            (Some(result), Some(report)) => results.push(result.with_domain(report)),
            (Some(result), None) => results.push(result),
            (None, Some(report)) => results.push(ScanResult::domain_only(target.clone(), report)),
            (None, None) => {}
        }
    }

    if results.is_empty() {
        anyhow::bail!("nothing to scan: no selected platform or analysis applies to the given targets");
    }

    let options = ReportOptions {
        show_not_found: config.output.show_not_found,
    };
    match &cli.output {
        Some(path) => {
            save_report(path, &results, format, options)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            eprintln!("Report saved to {}", path.display());
        }
        None => {
            let rendered = render(&results, format, options)?;
            std::io::stdout()
                .lock()
                .write_all(rendered.as_bytes())
                .context("failed to write report to stdout")?;
        }
    }

    Ok(finish(&results, cancel.is_cancelled()))
}

/// How a run that produced `results` ends; an interrupt during output wins.
fn finish(results: &[ScanResult], interrupted: bool) -> Outcome {
    if interrupted {
        return Outcome::Interrupted;
    }

    if results.iter().all(ScanResult::is_exhausted) {
        warn!("every probe failed; check network connectivity");
        return Outcome::Exhausted;
    }

    let found: usize = results.iter().map(|r| r.summary().found).sum();
    info!(targets = results.len(), found, "run complete");
    Outcome::Completed
}
