use std::path::PathBuf;

use dcs_core::{
    ArchiveSource, GeneratorConfig, HandlebarsRenderer, HttpArchiveSource, LocalArchiveSource,
    StatementService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the conformance statement runner
///
/// Regenerates the DICOM conformance statement in one pass, configured entirely from the
/// environment (a `.env` file is honoured). Intended to be run as a build step.
///
/// # Environment Variables
/// - `DCS_SOURCE_ROOT`: source tree holding the build parameters, data file and template
///   (default: ".")
/// - `DCS_PARAMETERS_FILE`: build parameters file override
/// - `DCS_TRANSFER_SYNTAXES_FILE`: transfer syntax JSON data file override
/// - `DCS_TEMPLATE_FILE`: conformance statement template override
/// - `DCS_OUTPUT_FILE`: rendered statement override
/// - `DCS_DOWNLOAD_BASE_URL`: base URL of the toolkit archives
/// - `DCS_ARCHIVE_FILE`: already downloaded toolkit archive (skips the network)
///
/// # Returns
/// * `Ok(())` - If the statement was rendered and written
/// * `Err(anyhow::Error)` - On the first failing stage; no output is written
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dcs_core=info".parse()?)
                .add_directive("dcs_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config_from_env();
    tracing::info!("++ Generating {}", config.output_file().display());

    let source: Box<dyn ArchiveSource> = match env_path("DCS_ARCHIVE_FILE") {
        Some(path) => Box::new(LocalArchiveSource::new(path)),
        None => Box::new(HttpArchiveSource::new()?),
    };

    let service = StatementService::new(config)?;
    let summary = service.generate(source.as_ref(), &HandlebarsRenderer::new())?;

    tracing::info!(
        "++ DCMTK {}: {} current, {} draft, {} retired Storage SOP classes, {} transfer syntaxes",
        summary.version,
        summary.current,
        summary.draft,
        summary.retired,
        summary.transfer_syntaxes
    );

    Ok(())
}

/// Build the generator configuration from `DCS_*` environment variables.
fn config_from_env() -> GeneratorConfig {
    let root = env_path("DCS_SOURCE_ROOT").unwrap_or_else(|| PathBuf::from("."));
    let mut config = GeneratorConfig::for_source_tree(&root);

    if let Some(path) = env_path("DCS_PARAMETERS_FILE") {
        config = config.with_parameters_file(path);
    }
    if let Some(path) = env_path("DCS_TRANSFER_SYNTAXES_FILE") {
        config = config.with_transfer_syntaxes_file(path);
    }
    if let Some(path) = env_path("DCS_TEMPLATE_FILE") {
        config = config.with_template_file(path);
    }
    if let Some(path) = env_path("DCS_OUTPUT_FILE") {
        config = config.with_output_file(path);
    }
    if let Some(url) = env_value("DCS_DOWNLOAD_BASE_URL") {
        config = config.with_download_base_url(url);
    }

    config
}

/// Non-empty value of an environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_value(name).map(PathBuf::from)
}
