use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::ManweaveConfig;
use crate::config::normalize_template;
use crate::context::RunContext;
use crate::record::KEY_FILE;
use crate::record::MetadataRecord;
use crate::record::SIDECAR_SUFFIX;
use crate::resolver::resolve;

/// Write an index file into every top-level category directory under the
/// output root.
///
/// The generators never re-parse source files: their only input is the
/// metadata sidecars the scan phase persisted.
pub fn generate_index_files(config: &ManweaveConfig, ctx: &RunContext) {
	for dir in category_dirs(&config.output) {
		generate_index_file(config, ctx, &dir);
	}
}

/// Write a concatenated document into every top-level category directory
/// under the output root.
pub fn generate_concat_files(config: &ManweaveConfig, ctx: &RunContext) {
	for dir in category_dirs(&config.output) {
		generate_concat_file(config, ctx, &dir);
	}
}

fn generate_index_file(config: &ManweaveConfig, ctx: &RunContext, dir: &Path) {
	let entries = load_entries(dir, &config.output_extension, &config.index.order_by);

	let empty = MetadataRecord::new();
	let line_template = normalize_template(&config.index.line);
	let mut out = String::new();
	out.push_str(&resolve(&empty, &normalize_template(&config.index.header), ctx));
	out.push('\n');
	for record in entries.values() {
		out.push_str(&resolve(record, &line_template, ctx));
		out.push('\n');
	}
	out.push_str(&resolve(&empty, &normalize_template(&config.index.footer), ctx));

	let path = dir.join(&config.index.file_name);
	info!(path = %path.display(), entries = entries.len(), "writing index");
	if let Err(error) = std::fs::write(&path, out) {
		warn!(path = %path.display(), %error, "failed to write index");
	}
}

fn generate_concat_file(config: &ManweaveConfig, ctx: &RunContext, dir: &Path) {
	let entries = load_entries(dir, &config.output_extension, &config.concat.order_by);

	let mut out = String::new();
	out.push_str(&normalize_template(&config.concat.header));
	for record in entries.values() {
		let Some(file_name) = record.get(KEY_FILE) else {
			continue;
		};
		let entry_path = dir.join(file_name);
		match std::fs::read_to_string(&entry_path) {
			Ok(body) => {
				out.push_str(&body);
				out.push_str("\n\n");
			}
			Err(error) => {
				warn!(path = %entry_path.display(), %error, "unreadable manual; left out of concat");
			}
		}
	}
	out.push_str(&normalize_template(&config.concat.footer));

	let path = dir.join(&config.concat.file_name);
	info!(path = %path.display(), entries = entries.len(), "writing concat");
	if let Err(error) = std::fs::write(&path, out) {
		warn!(path = %path.display(), %error, "failed to write concat");
	}

	// The concat pass also rewrites the category index, with the index
	// header and footer and no entry lines.
	let empty = MetadataRecord::new();
	let mut index_out = String::new();
	index_out.push_str(&resolve(&empty, &normalize_template(&config.index.header), ctx));
	index_out.push('\n');
	index_out.push_str(&resolve(&empty, &normalize_template(&config.index.footer), ctx));
	let index_path = dir.join(&config.index.file_name);
	info!(path = %index_path.display(), "writing index");
	if let Err(error) = std::fs::write(&index_path, index_out) {
		warn!(path = %index_path.display(), %error, "failed to write index");
	}
}

/// Top-level, non-hidden category directories under the output root, in
/// sorted order.
fn category_dirs(output: &Path) -> Vec<PathBuf> {
	let entries = match std::fs::read_dir(output) {
		Ok(entries) => entries,
		Err(error) => {
			warn!(path = %output.display(), %error, "unreadable output directory");
			return Vec::new();
		}
	};

	let mut dirs: Vec<PathBuf> = entries
		.filter_map(Result::ok)
		.map(|entry| entry.path())
		.filter(|path| {
			path.is_dir()
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(|name| !name.starts_with('.'))
		})
		.collect();
	dirs.sort();
	dirs
}

/// Load the sidecar record of every rendered manual in `dir`, keyed by the
/// composite sort key `record[order_by]` + `\u{1f}` + file name.
///
/// The composite key makes ordering deterministic (lexicographic) and
/// deduplicates: two entries with the same key collapse to the later one.
/// The separator sits below every printable character, so entries without a
/// sort value lead and the file name only breaks ties. Files without a
/// readable sidecar — including previously generated index and concat
/// documents — are skipped.
fn load_entries(
	dir: &Path,
	extension: &str,
	order_by: &str,
) -> BTreeMap<String, MetadataRecord> {
	let mut entries = BTreeMap::new();
	let suffix = format!(".{extension}");

	let dir_entries = match std::fs::read_dir(dir) {
		Ok(dir_entries) => dir_entries,
		Err(error) => {
			warn!(path = %dir.display(), %error, "unreadable category directory");
			return entries;
		}
	};

	for entry in dir_entries.filter_map(Result::ok) {
		let path = entry.path();
		if !path.is_file() {
			continue;
		}
		let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
			continue;
		};
		if !file_name.ends_with(&suffix) {
			continue;
		}

		let sidecar = dir.join(format!("{file_name}.{SIDECAR_SUFFIX}"));
		let mut record = match MetadataRecord::load(&sidecar) {
			Ok(record) => record,
			Err(error) => {
				debug!(path = %sidecar.display(), %error, "no usable sidecar; entry skipped");
				continue;
			}
		};
		record.set(KEY_FILE, file_name);

		let key = format!("{}\u{1f}{file_name}", record.get_or(order_by, ""));
		entries.insert(key, record);
	}

	entries
}
