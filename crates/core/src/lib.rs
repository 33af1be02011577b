//! # DCS Core
//!
//! Generation of the DICOM conformance statement from the DCMTK toolkit sources.
//!
//! This crate holds the whole pipeline as plain library code:
//! - Toolkit version lookup in the CMake build parameters
//! - Download of the toolkit release and extraction of `dcuid.h`
//! - Storage SOP class extraction, classification and column alignment
//! - Transfer syntax table normalisation
//! - Template rendering and atomic replacement of the output document
//!
//! **No process concerns**: environment variables, flags and logging setup belong in the
//! `dcs` CLI and the `dcs-run` runner.

pub mod align;
pub mod archive;
pub mod config;
pub mod constants;
pub mod error;
pub mod render;
pub mod statement;
pub mod storage;
pub mod transfer_syntax;
pub mod version;

pub use align::{AlignedEntry, UidEntry};
pub use archive::{ArchiveMember, ArchiveSource, HttpArchiveSource, LocalArchiveSource};
pub use config::GeneratorConfig;
pub use error::{ConformanceError, ConformanceResult};
pub use render::{HandlebarsRenderer, RenderContext, TemplateRenderer};
pub use statement::{GenerationSummary, RenderedStatement, StatementService, StorageReport};
pub use storage::{SopClassStatus, StorageClasses};

pub use dcs_types::NonEmptyText;
