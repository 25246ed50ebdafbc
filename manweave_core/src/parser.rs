use std::path::Path;

use tracing::warn;

use crate::config::FileTypeRule;
use crate::record::KEY_CATEGORY;
use crate::record::KEY_FILE_IDENT;
use crate::record::KEY_FILE_NAME;
use crate::record::KEY_FILE_PATH;
use crate::record::KEY_FILE_START;
use crate::record::KEY_SUFFIX;
use crate::record::MetadataRecord;

/// Identity of the source file a block came from, precomputed once per file.
#[derive(Debug, Clone)]
pub struct FileContext {
	/// Bare file name.
	pub name: String,
	/// File name without its extension; the stem of every ident derived
	/// from this file.
	pub stem: String,
	/// Path relative to the matched start directory, `/`-separated.
	pub path: String,
	/// The start directory itself.
	pub start: String,
}

impl FileContext {
	pub fn new(file: &Path, start: &Path) -> Self {
		let name = file
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();
		let stem = file
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();
		let path = file
			.strip_prefix(start)
			.unwrap_or(file)
			.to_string_lossy()
			.replace('\\', "/");
		let start = start.to_string_lossy().replace('\\', "/");

		Self {
			name,
			stem,
			path,
			start,
		}
	}
}

/// Parsing inputs shared by every block of a run.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions<'a> {
	/// Normalized text prepended to each body.
	pub text_header: &'a str,
	/// Normalized text appended to each body.
	pub text_footer: &'a str,
	/// Accepted first-line type markers; empty accepts any marker.
	pub block_markers: &'a [String],
}

/// Why a block was dropped instead of parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
	/// The first line had fewer than two whitespace-separated tokens.
	MalformedHeader { line: String },
	/// The first line's type marker is not in the configured marker set.
	UnrecognizedMarker { marker: String },
}

/// A successfully parsed block: its metadata record and the accumulated body
/// text, already wrapped in the configured text header and footer but not
/// yet placeholder-resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
	pub record: MetadataRecord,
	pub body: String,
}

/// Parse one raw block body into a metadata record plus body text.
///
/// The block is consumed line by line, each line trimmed of surrounding
/// whitespace, through three regions:
///
/// 1. The first line must carry at least two tokens: the category, then the
///    type marker.
/// 2. The header region: lines starting with the rule's header prefix are
///    `key:value` pairs (split on the first colon, key lowercased, first
///    assignment wins). The first line without the prefix ends the region
///    permanently.
/// 3. The body region: the rule's line prefix is stripped when present,
///    lines starting with an ignore prefix are dropped, and everything else
///    is appended followed by a newline.
///
/// `block_index` disambiguates idents for files carrying several blocks: the
/// derived `file.ident` is the file stem plus the block's `suffix` header
/// value, or the zero-padded index when no suffix is given.
pub fn parse_block(
	raw: &str,
	file: &FileContext,
	block_index: usize,
	rule: &FileTypeRule,
	options: &ParseOptions<'_>,
) -> Result<ParsedBlock, ParseFailure> {
	let mut record = MetadataRecord::new();
	record.set(KEY_FILE_NAME, file.name.as_str());
	record.set(KEY_FILE_PATH, file.path.as_str());
	record.set(KEY_FILE_START, file.start.as_str());

	let mut body = String::from(options.text_header);
	let mut first = true;
	let mut in_header = true;

	for raw_line in raw.lines() {
		let line = raw_line.trim();

		if first {
			let mut tokens = line.split_whitespace();
			let (Some(category), Some(marker)) = (tokens.next(), tokens.next()) else {
				return Err(ParseFailure::MalformedHeader {
					line: line.to_string(),
				});
			};
			if !options.block_markers.is_empty()
				&& !options.block_markers.iter().any(|m| m == marker)
			{
				return Err(ParseFailure::UnrecognizedMarker {
					marker: marker.to_string(),
				});
			}
			record.set(KEY_CATEGORY, category);
			first = false;
			continue;
		}

		if in_header {
			if let Some(rest) = line.strip_prefix(rule.header_prefix.as_str()) {
				if let Some((key, value)) = rest.split_once(':') {
					if !record.insert(key.trim(), value.trim()) {
						warn!(
							key = key.trim(),
							file = %file.name,
							"duplicate header key ignored"
						);
					}
				}
				continue;
			}
			// Header and body never interleave: the first unprefixed line
			// closes the header region for the rest of the block.
			in_header = false;
		}

		let mut line = line;
		if let Some(stripped) = line.strip_prefix(rule.line_prefix.as_str()) {
			line = stripped.trim();
		}
		if rule
			.ignore
			.iter()
			.any(|prefix| !prefix.is_empty() && line.starts_with(prefix.as_str()))
		{
			continue;
		}
		body.push_str(line);
		body.push('\n');
	}

	if first {
		// Empty block: no first line was ever seen.
		return Err(ParseFailure::MalformedHeader {
			line: String::new(),
		});
	}

	let disambiguator = match record.get(KEY_SUFFIX) {
		Some(suffix) => suffix.to_string(),
		None => format!("{block_index:04}"),
	};
	record.set(KEY_FILE_IDENT, format!("{}{disambiguator}", file.stem));

	body.push_str(options.text_footer);

	Ok(ParsedBlock { record, body })
}
