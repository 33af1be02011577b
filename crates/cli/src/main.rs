use clap::{Args, Parser, Subcommand};
use dcs_core::{
    ArchiveSource, ConformanceResult, GeneratorConfig, HandlebarsRenderer, HttpArchiveSource,
    LocalArchiveSource, StatementService,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dcs")]
#[command(about = "DICOM conformance statement generator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the conformance statement and replace the output file
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the rendered statement instead of writing the output file
        #[arg(long)]
        stdout: bool,
    },
    /// Print the toolkit version and its download URL
    Version {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the Storage SOP classes declared by the toolkit
    StorageUids {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the supported transfer syntaxes
    TransferSyntaxes {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Root of the source tree holding the build parameters, data file and template
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Build parameters file (overrides the source tree layout)
    #[arg(long)]
    parameters: Option<PathBuf>,
    /// Transfer syntax JSON data file (overrides the source tree layout)
    #[arg(long)]
    transfer_syntaxes: Option<PathBuf>,
    /// Conformance statement template (overrides the source tree layout)
    #[arg(long)]
    template: Option<PathBuf>,
    /// Output file (overrides the source tree layout)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Base URL the toolkit archive is downloaded from
    #[arg(long)]
    base_url: Option<String>,
    /// Use an already downloaded toolkit archive instead of the network
    #[arg(long)]
    archive: Option<PathBuf>,
}

impl SourceArgs {
    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::for_source_tree(&self.root);
        if let Some(path) = &self.parameters {
            config = config.with_parameters_file(path.clone());
        }
        if let Some(path) = &self.transfer_syntaxes {
            config = config.with_transfer_syntaxes_file(path.clone());
        }
        if let Some(path) = &self.template {
            config = config.with_template_file(path.clone());
        }
        if let Some(path) = &self.output {
            config = config.with_output_file(path.clone());
        }
        if let Some(url) = &self.base_url {
            config = config.with_download_base_url(url.clone());
        }
        config
    }

    fn service(&self) -> ConformanceResult<StatementService> {
        StatementService::new(self.config())
    }

    fn archive_source(&self) -> ConformanceResult<Box<dyn ArchiveSource>> {
        match &self.archive {
            Some(path) => Ok(Box::new(LocalArchiveSource::new(path.clone()))),
            None => Ok(Box::new(HttpArchiveSource::new()?)),
        }
    }
}

fn generate(source: &SourceArgs, stdout: bool) -> ConformanceResult<()> {
    let service = source.service()?;
    let archive = source.archive_source()?;
    let renderer = HandlebarsRenderer::new();

    if stdout {
        let rendered = service.render(archive.as_ref(), &renderer)?;
        print!("{}", rendered.text);
        return Ok(());
    }

    let summary = service.generate(archive.as_ref(), &renderer)?;
    println!(
        "Wrote {} (DCMTK {}): {} current, {} draft, {} retired Storage SOP classes, {} transfer syntaxes",
        summary.output_file.display(),
        summary.version,
        summary.current,
        summary.draft,
        summary.retired,
        summary.transfer_syntaxes
    );
    Ok(())
}

fn version(source: &SourceArgs) -> ConformanceResult<()> {
    let service = source.service()?;
    let version = service.version()?;
    println!("{}", version);
    println!("{}", service.config().archive_url(&version));
    Ok(())
}

fn storage_uids(source: &SourceArgs) -> ConformanceResult<()> {
    let service = source.service()?;
    let archive = source.archive_source()?;
    let report = service.storage_classes(archive.as_ref())?;

    println!("Source: {} ({})", report.archive_url, report.member_path);
    for (title, entries) in [
        ("Current", &report.classes.current),
        ("Draft", &report.classes.draft),
        ("Retired", &report.classes.retired),
    ] {
        println!();
        println!("{} ({}):", title, entries.len());
        for entry in entries {
            println!("  {} {}", entry.padded_name(), entry.uid());
        }
    }
    Ok(())
}

fn transfer_syntaxes(source: &SourceArgs) -> ConformanceResult<()> {
    let service = source.service()?;
    for entry in service.transfer_syntaxes()? {
        println!("{} {}", entry.padded_name(), entry.uid());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dcs_core=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Some(Commands::Generate { source, stdout }) => generate(&source, stdout),
        Some(Commands::Version { source }) => version(&source),
        Some(Commands::StorageUids { source }) => storage_uids(&source),
        Some(Commands::TransferSyntaxes { source }) => transfer_syntaxes(&source),
        None => {
            println!("Use 'dcs --help' for commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_source_args_overrides() {
        let cli = Cli::parse_from([
            "dcs",
            "version",
            "--root",
            "/src/orthanc",
            "--parameters",
            "/tmp/params.cmake",
            "--base-url",
            "http://mirror.local",
        ]);

        let Some(Commands::Version { source }) = cli.command else {
            panic!("Expected version subcommand");
        };
        let config = source.config();

        assert_eq!(config.parameters_file(), Path::new("/tmp/params.cmake"));
        assert!(config.template_file().starts_with("/src/orthanc"));
        assert_eq!(config.download_base_url(), "http://mirror.local");
    }

    #[test]
    fn test_generate_stdout_flag() {
        let cli = Cli::parse_from(["dcs", "generate", "--stdout", "--archive", "dcmtk.tar.gz"]);

        match cli.command {
            Some(Commands::Generate { source, stdout }) => {
                assert!(stdout);
                assert_eq!(source.archive, Some(PathBuf::from("dcmtk.tar.gz")));
                assert_eq!(source.root, PathBuf::from("."));
            }
            _ => panic!("Expected generate subcommand"),
        }
    }
}
