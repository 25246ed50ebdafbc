use std::path::Path;
use std::path::PathBuf;

use tracing::error;
use tracing::info;
use tracing::warn;

use crate::ManweaveResult;
use crate::record::KEY_CATEGORY;
use crate::record::KEY_FILE_IDENT;
use crate::record::KEY_FILE_NAME;
use crate::record::MetadataRecord;
use crate::record::SIDECAR_SUFFIX;

/// Persist one rendered manual and its metadata sidecar into the
/// category-keyed output tree.
///
/// The target is `output/<normalized category>/<normalized ident>.<ext>`;
/// the category directory is created on demand and existing files at the
/// exact target path are overwritten silently. A record without a category
/// is dropped with a warning and `Ok(None)` — the only hard precondition.
/// A sidecar write failure is reported but does not fail the call.
pub fn write_manual(
	record: &MetadataRecord,
	text: &str,
	output: &Path,
	extension: &str,
) -> ManweaveResult<Option<PathBuf>> {
	let category = record.get_or(KEY_CATEGORY, "");
	if category.is_empty() {
		warn!(
			file = record.get_or(KEY_FILE_NAME, "?"),
			"category not set; manual dropped"
		);
		return Ok(None);
	}

	let dir = output.join(normalize_component(category));
	std::fs::create_dir_all(&dir)?;

	let file_name = format!(
		"{}.{extension}",
		normalize_component(record.get_or(KEY_FILE_IDENT, "manual"))
	);
	let path = dir.join(&file_name);
	info!(path = %path.display(), "writing manual");
	std::fs::write(&path, text)?;

	let sidecar = dir.join(format!("{file_name}.{SIDECAR_SUFFIX}"));
	if let Err(io_error) = record.save(&sidecar) {
		error!(path = %sidecar.display(), %io_error, "failed to save metadata sidecar");
	}

	Ok(Some(path))
}

/// Collapse a record-supplied name into a single safe path component:
/// everything outside `[A-Za-z0-9._-]` becomes `_`, and dot-only names
/// (which would otherwise traverse upward) are rewritten wholesale.
pub fn normalize_component(name: &str) -> String {
	let normalized: String = name
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.collect();

	if normalized.is_empty() || normalized.chars().all(|c| c == '.') {
		return "_".to_string();
	}
	normalized
}
