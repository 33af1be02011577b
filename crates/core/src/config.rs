//! Generator configuration.
//!
//! Configuration is resolved once by the binaries (from flags or environment variables) and then
//! passed into the pipeline. The core crate never reads process-wide environment variables.

use crate::constants::{
    ARCHIVE_EXTENSION, DEFAULT_ARTIFACT_NAME, DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_MEMBER_SUFFIX,
    DEFAULT_VERSION_VARIABLE, OUTPUT_FILE, PARAMETERS_FILE, TEMPLATE_FILE, TRANSFER_SYNTAXES_FILE,
};
use crate::{ConformanceError, ConformanceResult};
use dcs_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Everything the pipeline needs to locate its inputs and outputs.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    parameters_file: PathBuf,
    transfer_syntaxes_file: PathBuf,
    template_file: PathBuf,
    output_file: PathBuf,
    download_base_url: String,
    artifact_name: String,
    version_variable: String,
    member_suffix: String,
}

impl GeneratorConfig {
    /// Build a configuration using the standard layout below `root`.
    pub fn for_source_tree(root: &Path) -> Self {
        Self {
            parameters_file: root.join(PARAMETERS_FILE),
            transfer_syntaxes_file: root.join(TRANSFER_SYNTAXES_FILE),
            template_file: root.join(TEMPLATE_FILE),
            output_file: root.join(OUTPUT_FILE),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.into(),
            artifact_name: DEFAULT_ARTIFACT_NAME.into(),
            version_variable: DEFAULT_VERSION_VARIABLE.into(),
            member_suffix: DEFAULT_MEMBER_SUFFIX.into(),
        }
    }

    pub fn with_parameters_file(mut self, path: PathBuf) -> Self {
        self.parameters_file = path;
        self
    }

    pub fn with_transfer_syntaxes_file(mut self, path: PathBuf) -> Self {
        self.transfer_syntaxes_file = path;
        self
    }

    pub fn with_template_file(mut self, path: PathBuf) -> Self {
        self.template_file = path;
        self
    }

    pub fn with_output_file(mut self, path: PathBuf) -> Self {
        self.output_file = path;
        self
    }

    pub fn with_download_base_url(mut self, url: impl Into<String>) -> Self {
        self.download_base_url = url.into();
        self
    }

    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    pub fn with_version_variable(mut self, variable: impl Into<String>) -> Self {
        self.version_variable = variable.into();
        self
    }

    pub fn with_member_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.member_suffix = suffix.into();
        self
    }

    /// Reject settings that can never produce a usable download or match.
    ///
    /// # Errors
    ///
    /// Returns `ConformanceError::Configuration` naming the first empty setting.
    pub fn validate(&self) -> ConformanceResult<()> {
        let required = [
            ("download base URL", &self.download_base_url),
            ("artifact name", &self.artifact_name),
            ("version variable", &self.version_variable),
            ("archive member suffix", &self.member_suffix),
        ];

        for (label, value) in required {
            NonEmptyText::new(value)
                .map_err(|_| ConformanceError::Configuration(format!("{label} cannot be empty")))?;
        }

        Ok(())
    }

    pub fn parameters_file(&self) -> &Path {
        &self.parameters_file
    }

    pub fn transfer_syntaxes_file(&self) -> &Path {
        &self.transfer_syntaxes_file
    }

    pub fn template_file(&self) -> &Path {
        &self.template_file
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn download_base_url(&self) -> &str {
        &self.download_base_url
    }

    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    pub fn version_variable(&self) -> &str {
        &self.version_variable
    }

    pub fn member_suffix(&self) -> &str {
        &self.member_suffix
    }

    /// Download URL of the toolkit archive for `version`.
    ///
    /// Format: `<base-url>/<artifact-name>-<version>.tar.gz`
    pub fn archive_url(&self, version: &NonEmptyText) -> String {
        format!(
            "{}/{}-{}{}",
            self.download_base_url.trim_end_matches('/'),
            self.artifact_name,
            version,
            ARCHIVE_EXTENSION
        )
    }
}
