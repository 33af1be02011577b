//! Conformance statement rendering.
//!
//! The pipeline only depends on [`TemplateRenderer`]; [`HandlebarsRenderer`] is the engine used
//! by the binaries. Templates iterate the four tables with `{{#each <table>}}` blocks, each entry
//! exposing `name` (column padded) and `uid`:
//!
//! ```text
//! {{#each store_scp}}
//!   {{name}} | {{uid}}
//! {{/each}}
//! ```

use crate::align::AlignedEntry;
use crate::constants::TEMPLATE_MARKERS;
use crate::storage::StorageClasses;
use crate::{ConformanceError, ConformanceResult};
use handlebars::template::{Template, TemplateElement};
use handlebars::Handlebars;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// The four tables bound into the template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub store_scp: Vec<AlignedEntry>,
    pub draft_store_scp: Vec<AlignedEntry>,
    pub retired_store_scp: Vec<AlignedEntry>,
    pub transfer_syntaxes: Vec<AlignedEntry>,
}

impl RenderContext {
    pub fn new(storage: StorageClasses, transfer_syntaxes: Vec<AlignedEntry>) -> Self {
        Self {
            store_scp: storage.current,
            draft_store_scp: storage.draft,
            retired_store_scp: storage.retired,
            transfer_syntaxes,
        }
    }
}

/// Turns a template and the bound tables into the final document text.
pub trait TemplateRenderer {
    /// # Errors
    ///
    /// Returns `ConformanceError::Template` if the template is malformed or does not reference
    /// every table.
    fn render(&self, template: &str, context: &RenderContext) -> ConformanceResult<String>;
}

/// Handlebars engine with HTML escaping disabled and strict variable lookup.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> ConformanceResult<String> {
        check_insertion_points(template)?;

        self.registry
            .render_template(template, context)
            .map_err(|e| ConformanceError::Template(e.to_string()))
    }
}

/// Verify that the template iterates every table with an `{{#each <table>}}` block.
///
/// The template is parsed first, so a block that only appears inside a comment or a raw
/// string does not count.
///
/// # Errors
///
/// Returns `ConformanceError::Template` if the template does not parse or names the missing
/// tables.
pub fn check_insertion_points(template: &str) -> ConformanceResult<()> {
    let compiled =
        Template::compile(template).map_err(|e| ConformanceError::Template(e.to_string()))?;

    let mut iterated = Vec::new();
    collect_each_targets(&compiled, &mut iterated);

    let missing: Vec<&str> = TEMPLATE_MARKERS
        .into_iter()
        .filter(|marker| !iterated.contains(marker))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConformanceError::Template(format!(
            "template does not reference {}",
            missing.join(", ")
        )))
    }
}

/// Push the parameter of every `{{#each}}` block in `template`, nested blocks included.
fn collect_each_targets<'a>(template: &'a Template, found: &mut Vec<&'a str>) {
    for element in &template.elements {
        match element {
            TemplateElement::HelperBlock(block) => {
                if block.name.as_name() == Some("each") {
                    if let Some(target) = block.params.first().and_then(|p| p.as_name()) {
                        found.push(target);
                    }
                }
                for inner in block.template.iter().chain(block.inverse.iter()) {
                    collect_each_targets(inner, found);
                }
            }
            TemplateElement::DecoratorBlock(block) | TemplateElement::PartialBlock(block) => {
                if let Some(inner) = &block.template {
                    collect_each_targets(inner, found);
                }
            }
            _ => {}
        }
    }
}

/// Replace `path` with `contents` in one step.
///
/// The text is written to a temporary file next to `path` and renamed over it, so readers see
/// either the previous document or the complete new one. An existing file keeps its
/// permissions; a new one gets the usual mode for created files (`0o666` less the umask).
///
/// # Errors
///
/// Returns `ConformanceError::FileWrite` if the temporary file cannot be created, written or
/// renamed.
pub fn write_atomically(path: &Path, contents: &str) -> ConformanceResult<()> {
    let write_error = |source: std::io::Error| ConformanceError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(dir).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }
    file.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}
