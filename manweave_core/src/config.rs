use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ManweaveError;
use crate::ManweaveResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["manweave.toml", ".manweave.toml"];

/// Block grammar for one file extension.
///
/// A rule is pure data: it names the file suffix it applies to and the
/// delimiter strings the scanner and parser use for files of that type.
///
/// ```toml
/// [[file_types]]
/// extension = "rs"
/// block_start = "/*#"
/// block_end = "*/"
/// header_prefix = "*#"
/// line_prefix = "*"
/// ignore = ["@"]
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct FileTypeRule {
	/// File suffix this rule applies to, without the leading dot.
	pub extension: String,
	/// Token opening a raw block.
	#[serde(default = "default_block_start")]
	pub block_start: String,
	/// Token closing a raw block.
	#[serde(default = "default_block_end")]
	pub block_end: String,
	/// Prefix marking a header metadata line within a block.
	#[serde(default = "default_header_prefix")]
	pub header_prefix: String,
	/// Prefix stripped from the start of each body line when present.
	#[serde(default = "default_line_prefix")]
	pub line_prefix: String,
	/// Body lines starting with any of these prefixes are dropped.
	#[serde(default)]
	pub ignore: Vec<String>,
}

impl FileTypeRule {
	/// A rule for `extension` with the default block grammar.
	pub fn new(extension: impl Into<String>) -> Self {
		Self {
			extension: extension.into(),
			block_start: default_block_start(),
			block_end: default_block_end(),
			header_prefix: default_header_prefix(),
			line_prefix: default_line_prefix(),
			ignore: Vec::new(),
		}
	}

	/// Whether a file name matches this rule's extension.
	pub fn matches(&self, file_name: &str) -> bool {
		!self.extension.is_empty()
			&& file_name
				.strip_suffix(self.extension.as_str())
				.is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
	}
}

fn default_block_start() -> String {
	"/*#".to_string()
}

fn default_block_end() -> String {
	"*/".to_string()
}

fn default_header_prefix() -> String {
	"*#".to_string()
}

fn default_line_prefix() -> String {
	"*".to_string()
}

/// Controls for the per-category index files written after the scan phase.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct IndexConfig {
	/// When true, an index file is written into every category directory.
	#[serde(default)]
	pub enabled: bool,
	/// Name of the generated index file.
	#[serde(default = "default_index_file_name")]
	pub file_name: String,
	/// Text placed before the entry lines.
	#[serde(default)]
	pub header: String,
	/// Text placed after the entry lines.
	#[serde(default)]
	pub footer: String,
	/// Metadata key used as the primary ordering component.
	#[serde(default = "default_order_by")]
	pub order_by: String,
	/// Template rendered once per entry; `{{_file}}` expands to the entry's
	/// rendered file name and any metadata key is available.
	#[serde(default = "default_index_line")]
	pub line: String,
}

impl Default for IndexConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			file_name: default_index_file_name(),
			header: String::new(),
			footer: String::new(),
			order_by: default_order_by(),
			line: default_index_line(),
		}
	}
}

fn default_index_file_name() -> String {
	"index.adoc".to_string()
}

fn default_order_by() -> String {
	"sort".to_string()
}

fn default_index_line() -> String {
	"include::{{_file}}[]".to_string()
}

/// Controls for the per-category concatenated documents written after the
/// scan phase.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct ConcatConfig {
	/// When true, a concatenated document is written into every category
	/// directory.
	#[serde(default)]
	pub enabled: bool,
	/// Name of the generated document.
	#[serde(default = "default_concat_file_name")]
	pub file_name: String,
	/// Text placed before the concatenated bodies. Literal `\n` sequences
	/// are expanded to newlines.
	#[serde(default = "default_concat_header")]
	pub header: String,
	/// Text placed after the concatenated bodies.
	#[serde(default)]
	pub footer: String,
	/// Metadata key used as the primary ordering component.
	#[serde(default = "default_order_by")]
	pub order_by: String,
}

impl Default for ConcatConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			file_name: default_concat_file_name(),
			header: default_concat_header(),
			footer: String::new(),
			order_by: default_order_by(),
		}
	}
}

fn default_concat_file_name() -> String {
	"concat.adoc".to_string()
}

fn default_concat_header() -> String {
	"::toc::\n\n".to_string()
}

/// Configuration loaded from a `manweave.toml` file.
///
/// ```toml
/// root = "."
/// output = "manual"
/// output_extension = "adoc"
/// start = ["src"]
/// exclude = ["bin", "target", "test"]
///
/// [[file_types]]
/// extension = "rs"
///
/// [index]
/// enabled = true
/// header = "== Commands"
///
/// [properties]
/// product = "Example"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManweaveConfig {
	/// Traversal root the start directories are searched under.
	#[serde(default = "default_root")]
	pub root: PathBuf,
	/// Destination tree root.
	#[serde(default = "default_output")]
	pub output: PathBuf,
	/// Extension for rendered manual files, without the leading dot.
	#[serde(default = "default_output_extension")]
	pub output_extension: String,
	/// When true, the output directory is deleted and recreated before
	/// scanning.
	#[serde(default)]
	pub cleanup_output: bool,
	/// Path suffixes marking scan roots. A directory whose canonicalized
	/// path ends with one of these switches traversal into parse mode.
	#[serde(default = "default_start")]
	pub start: Vec<String>,
	/// Directory names pruned from traversal before any other rule.
	#[serde(default = "default_exclude")]
	pub exclude: Vec<String>,
	/// Opening placeholder token.
	#[serde(default = "default_placeholder_begin")]
	pub placeholder_begin: String,
	/// Closing placeholder token.
	#[serde(default = "default_placeholder_end")]
	pub placeholder_end: String,
	/// Text prepended to every rendered body. Literal `\n` sequences are
	/// expanded to newlines.
	#[serde(default)]
	pub text_header: String,
	/// Text appended to every rendered body.
	#[serde(default)]
	pub text_footer: String,
	/// When non-empty, only blocks whose first-line type marker is listed
	/// here are kept; others are dropped with a warning. The default (empty)
	/// accepts any marker.
	#[serde(default)]
	pub block_markers: Vec<String>,
	/// Per-extension block grammars, matched in declaration order. Defaults
	/// to a single rule for `rs`.
	#[serde(default = "default_file_types")]
	pub file_types: Vec<FileTypeRule>,
	/// Index-phase controls.
	#[serde(default)]
	pub index: IndexConfig,
	/// Concat-phase controls.
	#[serde(default)]
	pub concat: ConcatConfig,
	/// Project-level placeholder values, consulted after the block's own
	/// metadata record.
	#[serde(default)]
	pub properties: BTreeMap<String, String>,
}

impl Default for ManweaveConfig {
	fn default() -> Self {
		Self {
			root: default_root(),
			output: default_output(),
			output_extension: default_output_extension(),
			cleanup_output: false,
			start: default_start(),
			exclude: default_exclude(),
			placeholder_begin: default_placeholder_begin(),
			placeholder_end: default_placeholder_end(),
			text_header: String::new(),
			text_footer: String::new(),
			block_markers: Vec::new(),
			file_types: default_file_types(),
			index: IndexConfig::default(),
			concat: ConcatConfig::default(),
			properties: BTreeMap::new(),
		}
	}
}

fn default_root() -> PathBuf {
	PathBuf::from(".")
}

fn default_output() -> PathBuf {
	PathBuf::from("manual")
}

fn default_output_extension() -> String {
	"adoc".to_string()
}

fn default_start() -> Vec<String> {
	vec!["src".to_string()]
}

fn default_exclude() -> Vec<String> {
	vec!["bin".to_string(), "target".to_string(), "test".to_string()]
}

fn default_placeholder_begin() -> String {
	"{{".to_string()
}

fn default_placeholder_end() -> String {
	"}}".to_string()
}

fn default_file_types() -> Vec<FileTypeRule> {
	vec![FileTypeRule::new("rs")]
}

impl ManweaveConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ManweaveResult<Option<ManweaveConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: ManweaveConfig =
			toml::from_str(&content).map_err(|e| ManweaveError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(Some(config))
	}

	/// Check the rule set invariants: every extension appears at most once.
	pub fn validate(&self) -> ManweaveResult<()> {
		let mut seen = HashSet::new();
		for rule in &self.file_types {
			if !seen.insert(rule.extension.as_str()) {
				return Err(ManweaveError::DuplicateFileType(rule.extension.clone()));
			}
		}
		Ok(())
	}

	/// Find the first rule matching `file_name`, in declaration order.
	pub fn rule_for(&self, file_name: &str) -> Option<usize> {
		self.file_types.iter().position(|rule| rule.matches(file_name))
	}
}

/// Strip one surrounding pair of double quotes, if present. Configured
/// header/footer strings are often quoted to protect leading or trailing
/// whitespace from the config layer.
pub fn unquote(input: &str) -> &str {
	if input.len() >= 2 && input.starts_with('"') && input.ends_with('"') {
		&input[1..input.len() - 1]
	} else {
		input
	}
}

/// Expand literal `\n` sequences into real newlines.
pub fn expand_escapes(input: &str) -> String {
	input.replace("\\n", "\n")
}

/// Normalize a configured template string: unquote, then expand escaped
/// newlines.
pub fn normalize_template(input: &str) -> String {
	expand_escapes(unquote(input))
}
