//! Toolkit version lookup in the CMake build parameters.

use crate::{ConformanceError, ConformanceResult};
use dcs_types::NonEmptyText;
use regex::Regex;

/// Extract the version declared as `set(<variable> "<x.y.z>" CACHE STRING ...)`.
///
/// The declaration must appear exactly once in `parameters`.
///
/// # Errors
///
/// Returns `ConformanceError::Configuration` if the declaration is absent or repeated.
pub fn resolve_version(parameters: &str, variable: &str) -> ConformanceResult<NonEmptyText> {
    let pattern = format!(
        r#"set\({}\s+"([0-9.]+)"\s+CACHE\s+STRING"#,
        regex::escape(variable)
    );
    let re = Regex::new(&pattern)
        .map_err(|e| ConformanceError::Configuration(format!("invalid version pattern: {e}")))?;

    let versions: Vec<&str> = re
        .captures_iter(parameters)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    match versions.as_slice() {
        [version] => {
            tracing::debug!("{} resolved to {}", variable, version);
            NonEmptyText::new(version).map_err(|_| {
                ConformanceError::Configuration(format!("{variable} declares an empty version"))
            })
        }
        [] => Err(ConformanceError::Configuration(format!(
            "no set({variable} \"...\" CACHE STRING ...) declaration found"
        ))),
        many => Err(ConformanceError::Configuration(format!(
            "{variable} is declared {} times",
            many.len()
        ))),
    }
}
