use std::path::Path;

use crate::config::FileTypeRule;
use crate::config::ManweaveConfig;
use crate::parser::FileContext;
use crate::parser::ParseOptions;

/// The default `rs` rule.
pub(crate) fn rule() -> FileTypeRule {
	FileTypeRule::new("rs")
}

/// A rule with body-line ignore prefixes.
pub(crate) fn rule_with_ignore(prefixes: &[&str]) -> FileTypeRule {
	let mut rule = rule();
	rule.ignore = prefixes.iter().map(|p| (*p).to_string()).collect();
	rule
}

/// Context for a `widget.rs` file directly under its start directory.
pub(crate) fn file_ctx() -> FileContext {
	FileContext::new(Path::new("/proj/src/widget.rs"), Path::new("/proj/src"))
}

/// Options with no text header/footer and no marker filter.
pub(crate) fn plain_options() -> ParseOptions<'static> {
	ParseOptions {
		text_header: "",
		text_footer: "",
		block_markers: &[],
	}
}

/// A config rooted and writing inside a temp directory, with the default
/// `src` start suffix and `rs` rule.
pub(crate) fn tree_config(root: &Path, output: &Path) -> ManweaveConfig {
	ManweaveConfig {
		root: root.to_path_buf(),
		output: output.to_path_buf(),
		..ManweaveConfig::default()
	}
}
