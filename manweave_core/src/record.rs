use std::path::Path;

use crate::ManweaveError;
use crate::ManweaveResult;

/// Suffix appended to a rendered manual file's name to form its metadata
/// sidecar name (`intro0000.adoc` → `intro0000.adoc.meta`).
pub const SIDECAR_SUFFIX: &str = "meta";

/// Category taken from a block's first line; becomes the output
/// subdirectory.
pub const KEY_CATEGORY: &str = "category";
/// Ordering key consulted by the index and concat generators.
pub const KEY_SORT: &str = "sort";
/// Overrides the numeric disambiguator in [`KEY_FILE_IDENT`].
pub const KEY_SUFFIX: &str = "suffix";
/// Name of the source file the block was extracted from.
pub const KEY_FILE_NAME: &str = "file.name";
/// Source path relative to the matched start directory.
pub const KEY_FILE_PATH: &str = "file.path";
/// The start directory the source file was found under.
pub const KEY_FILE_START: &str = "file.start";
/// Unique slug used as the output file name stem within a category.
pub const KEY_FILE_IDENT: &str = "file.ident";
/// Injected by the generators: the bare rendered file name of an entry.
pub const KEY_FILE: &str = "_file";

/// The metadata record extracted from one block.
///
/// Keys are case-insensitive and kept in insertion order. Header keys use
/// first-assignment-wins semantics ([`MetadataRecord::insert`]); derived keys
/// set by the pipeline overwrite ([`MetadataRecord::set`]).
///
/// The record doubles as the payload of the on-disk sidecar file through a
/// line-oriented `key=value` codec ([`MetadataRecord::to_sidecar_string`] /
/// [`MetadataRecord::from_sidecar_str`]) that round-trips without loss. The
/// codec is deliberately separate from the in-memory representation so it can
/// evolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
	entries: Vec<(String, String)>,
}

impl MetadataRecord {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a key unless it is already present. Returns `true` when the
	/// value was stored. This is the header-key semantics: the first
	/// assignment within a block wins.
	pub fn insert(&mut self, key: &str, value: impl Into<String>) -> bool {
		let key = key.trim().to_lowercase();
		if self.position(&key).is_some() {
			return false;
		}
		self.entries.push((key, value.into()));
		true
	}

	/// Set a key, replacing any existing value.
	pub fn set(&mut self, key: &str, value: impl Into<String>) {
		let key = key.trim().to_lowercase();
		match self.position(&key) {
			Some(index) => self.entries[index].1 = value.into(),
			None => self.entries.push((key, value.into())),
		}
	}

	/// Case-insensitive lookup.
	pub fn get(&self, key: &str) -> Option<&str> {
		let key = key.to_lowercase();
		self.position(&key)
			.map(|index| self.entries[index].1.as_str())
	}

	/// Lookup with a default for absent keys.
	pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
		self.get(key).unwrap_or(default)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}

	fn position(&self, lowercase_key: &str) -> Option<usize> {
		self.entries
			.iter()
			.position(|(key, _)| key == lowercase_key)
	}

	/// Serialize into the sidecar codec: one `key=value` line per entry, in
	/// insertion order, with backslash, newline, carriage return, and `=` in
	/// keys escaped.
	pub fn to_sidecar_string(&self) -> String {
		let mut out = String::new();
		for (key, value) in &self.entries {
			out.push_str(&escape(key, true));
			out.push('=');
			out.push_str(&escape(value, false));
			out.push('\n');
		}
		out
	}

	/// Parse the sidecar codec. Blank lines and `#` comment lines are
	/// skipped; any other line must contain an unescaped `=`.
	pub fn from_sidecar_str(input: &str) -> Result<Self, String> {
		let mut record = Self::new();
		for (number, line) in input.lines().enumerate() {
			if line.is_empty() || line.starts_with('#') {
				continue;
			}
			let Some(separator) = find_unescaped_separator(line) else {
				return Err(format!("line {}: missing `=`", number + 1));
			};
			let key = unescape(&line[..separator])?;
			let value = unescape(&line[separator + 1..])?;
			record.set(&key, value);
		}
		Ok(record)
	}

	/// Write the sidecar file.
	pub fn save(&self, path: &Path) -> std::io::Result<()> {
		std::fs::write(path, self.to_sidecar_string())
	}

	/// Read a sidecar file back into a record.
	pub fn load(path: &Path) -> ManweaveResult<Self> {
		let content = std::fs::read_to_string(path)?;
		Self::from_sidecar_str(&content).map_err(|reason| ManweaveError::SidecarParse {
			path: path.display().to_string(),
			reason,
		})
	}
}

fn escape(input: &str, is_key: bool) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'=' if is_key => out.push_str("\\="),
			_ => out.push(c),
		}
	}
	out
}

fn unescape(input: &str) -> Result<String, String> {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('\\') => out.push('\\'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('=') => out.push('='),
			Some(other) => return Err(format!("invalid escape `\\{other}`")),
			None => return Err("dangling escape at end of line".to_string()),
		}
	}
	Ok(out)
}

/// Byte offset of the first `=` not preceded by a backslash escape.
fn find_unescaped_separator(line: &str) -> Option<usize> {
	let bytes = line.as_bytes();
	let mut escaped = false;
	for (index, byte) in bytes.iter().enumerate() {
		if escaped {
			escaped = false;
		} else if *byte == b'\\' {
			escaped = true;
		} else if *byte == b'=' {
			return Some(index);
		}
	}
	None
}
