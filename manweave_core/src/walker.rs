use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::config::ManweaveConfig;

/// One file selected for scanning: where it is, which start directory it
/// belongs to, and which file type rule matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	pub path: PathBuf,
	/// The enclosing start directory; relative paths in the block records
	/// are computed against it.
	pub start: PathBuf,
	/// Index into the configured rule list.
	pub rule_index: usize,
}

/// Walk the tree under `root` and collect every file eligible for scanning.
///
/// Traversal runs in two modes. In find mode, directories are tested against
/// the configured exclusions first (an excluded name prunes the subtree
/// entirely), then against the start suffixes; a match switches the subtree
/// into parse mode rooted there, and start matching stops — only the first
/// enclosing start directory counts. In parse mode every descendant file is
/// matched against the rules in declaration order and the first matching
/// extension wins.
///
/// Hidden entries (leading `.`) are skipped in both modes. Entries are
/// visited in sorted name order so runs are deterministic. Unreadable
/// directories are reported and skipped; the walk continues.
pub fn collect_sources(root: &Path, config: &ManweaveConfig) -> Vec<SourceFile> {
	let mut sources = Vec::new();
	find_start(root, config, &mut sources);
	sources
}

fn find_start(dir: &Path, config: &ManweaveConfig, sources: &mut Vec<SourceFile>) {
	debug!(path = %dir.display(), "searching for start directory");
	if is_excluded(dir, config) {
		debug!(path = %dir.display(), "excluded; pruned");
		return;
	}

	let dir_path = dir.to_string_lossy().replace('\\', "/");
	if config
		.start
		.iter()
		.any(|suffix| !suffix.is_empty() && dir_path.ends_with(suffix.as_str()))
	{
		debug!(path = %dir.display(), "start directory");
		parse_dir(dir, dir, config, sources);
		return;
	}

	for path in sorted_entries(dir) {
		if path.is_dir() && !is_hidden(&path) {
			find_start(&path, config, sources);
		}
	}
}

fn parse_dir(dir: &Path, start: &Path, config: &ManweaveConfig, sources: &mut Vec<SourceFile>) {
	debug!(path = %dir.display(), "scanning directory");
	for path in sorted_entries(dir) {
		if is_hidden(&path) {
			continue;
		}
		if path.is_dir() {
			parse_dir(&path, start, config, sources);
		} else if path.is_file() {
			let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
				continue;
			};
			if let Some(rule_index) = config.rule_for(name) {
				sources.push(SourceFile {
					path: path.clone(),
					start: start.to_path_buf(),
					rule_index,
				});
			}
		}
	}
}

fn is_excluded(dir: &Path, config: &ManweaveConfig) -> bool {
	dir.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| config.exclude.iter().any(|excluded| excluded == name))
}

fn is_hidden(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.starts_with('.'))
}

/// Directory entries in sorted name order. An unreadable directory yields no
/// entries and a warning; the caller keeps going.
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(error) => {
			warn!(path = %dir.display(), %error, "unreadable directory; skipped");
			return Vec::new();
		}
	};

	let mut paths: Vec<PathBuf> = entries
		.filter_map(|entry| match entry {
			Ok(entry) => Some(entry.path()),
			Err(error) => {
				warn!(path = %dir.display(), %error, "unreadable directory entry; skipped");
				None
			}
		})
		.collect();
	paths.sort();
	paths
}
