//! End-to-end conformance statement generation.
//!
//! Stages run strictly in order and the first failure aborts the run:
//!
//! 1. resolve the toolkit version from the build parameters
//! 2. download the toolkit archive and extract `dcuid.h`
//! 3. extract and classify the Storage SOP classes
//! 4. load the transfer syntax table
//! 5. render the template and atomically replace the output file
//!
//! Nothing is written unless every stage succeeded.

use crate::archive::{find_member, ArchiveSource};
use crate::config::GeneratorConfig;
use crate::render::{write_atomically, RenderContext, TemplateRenderer};
use crate::storage::{extract_storage_classes, StorageClasses};
use crate::transfer_syntax::load_transfer_syntaxes;
use crate::version::resolve_version;
use crate::{AlignedEntry, ConformanceError, ConformanceResult};
use dcs_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Storage SOP classes together with where they were read from.
#[derive(Debug, Clone)]
pub struct StorageReport {
    pub version: NonEmptyText,
    pub archive_url: String,
    pub member_path: String,
    pub classes: StorageClasses,
}

/// A fully rendered statement that has not been written anywhere yet.
#[derive(Debug, Clone)]
pub struct RenderedStatement {
    pub storage: StorageReport,
    pub transfer_syntax_count: usize,
    pub text: String,
}

/// Outcome of a successful [`StatementService::generate`] run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub version: NonEmptyText,
    pub archive_url: String,
    pub current: usize,
    pub draft: usize,
    pub retired: usize,
    pub transfer_syntaxes: usize,
    pub output_file: PathBuf,
}

/// Runs the generation stages against one configuration.
#[derive(Debug, Clone)]
pub struct StatementService {
    config: GeneratorConfig,
}

impl StatementService {
    /// # Errors
    ///
    /// Returns `ConformanceError::Configuration` if `config` fails validation.
    pub fn new(config: GeneratorConfig) -> ConformanceResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Toolkit version declared in the build parameters file.
    ///
    /// # Errors
    ///
    /// `FileRead` if the parameters file cannot be read, `Configuration` if the declaration is
    /// missing or repeated.
    pub fn version(&self) -> ConformanceResult<NonEmptyText> {
        let parameters = read_text(self.config.parameters_file())?;
        resolve_version(&parameters, self.config.version_variable())
    }

    /// Download the toolkit release and classify the Storage SOP classes it declares.
    ///
    /// # Errors
    ///
    /// Propagates version, network and archive errors.
    pub fn storage_classes(&self, source: &dyn ArchiveSource) -> ConformanceResult<StorageReport> {
        let version = self.version()?;
        let archive_url = self.config.archive_url(&version);
        tracing::info!(
            "{} {} resolved, archive {}",
            self.config.artifact_name(),
            version,
            archive_url
        );

        let archive = source.fetch(&archive_url)?;
        let member = find_member(&archive, self.config.member_suffix())?;
        let classes =
            extract_storage_classes(member.reader()).map_err(|e| ConformanceError::FileRead {
                path: PathBuf::from(&member.path),
                source: e,
            })?;

        Ok(StorageReport {
            version,
            archive_url,
            member_path: member.path,
            classes,
        })
    }

    /// Normalised transfer syntax table.
    ///
    /// # Errors
    ///
    /// `FileRead` or `DataFormat` for an unreadable or malformed data file.
    pub fn transfer_syntaxes(&self) -> ConformanceResult<Vec<AlignedEntry>> {
        load_transfer_syntaxes(self.config.transfer_syntaxes_file())
    }

    /// Run every stage up to rendering, without touching the output file.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn render(
        &self,
        source: &dyn ArchiveSource,
        renderer: &dyn TemplateRenderer,
    ) -> ConformanceResult<RenderedStatement> {
        let storage = self.storage_classes(source)?;
        let transfer_syntaxes = self.transfer_syntaxes()?;
        let template = read_text(self.config.template_file())?;

        let transfer_syntax_count = transfer_syntaxes.len();
        let context = RenderContext::new(storage.classes.clone(), transfer_syntaxes);
        let text = renderer.render(&template, &context)?;

        Ok(RenderedStatement {
            storage,
            transfer_syntax_count,
            text,
        })
    }

    /// Render the statement and replace the configured output file with it.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage; the output file is then left untouched.
    pub fn generate(
        &self,
        source: &dyn ArchiveSource,
        renderer: &dyn TemplateRenderer,
    ) -> ConformanceResult<GenerationSummary> {
        let rendered = self.render(source, renderer)?;
        let output_file = self.config.output_file().to_path_buf();
        write_atomically(&output_file, &rendered.text)?;
        tracing::info!("Wrote {}", output_file.display());

        let classes = &rendered.storage.classes;
        Ok(GenerationSummary {
            current: classes.current.len(),
            draft: classes.draft.len(),
            retired: classes.retired.len(),
            transfer_syntaxes: rendered.transfer_syntax_count,
            version: rendered.storage.version,
            archive_url: rendered.storage.archive_url,
            output_file,
        })
    }
}

fn read_text(path: &Path) -> ConformanceResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConformanceError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
