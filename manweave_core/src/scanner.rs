use tracing::warn;

use crate::config::FileTypeRule;

/// Result of scanning one file's content for raw blocks.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
	/// Raw block bodies in file order, each the text strictly between the
	/// rule's start and end delimiters.
	pub blocks: Vec<String>,
	/// True when a start delimiter had no matching end delimiter. The
	/// remainder of the file after that point is not scanned.
	pub unterminated: bool,
}

/// Scan `content` for blocks delimited by the rule's start and end tokens.
///
/// Blocks are non-overlapping and collected in file order; scanning resumes
/// immediately after each end delimiter. A start delimiter without a
/// matching end delimiter abandons the rest of the file and is reported both
/// through the outcome and as a warning.
pub fn scan_blocks(content: &str, rule: &FileTypeRule) -> ScanOutcome {
	let mut outcome = ScanOutcome::default();
	if rule.block_start.is_empty() || rule.block_end.is_empty() {
		warn!(
			extension = %rule.extension,
			"file type rule has an empty block delimiter; nothing scanned"
		);
		return outcome;
	}

	let mut rest = content;
	loop {
		let Some(begin) = rest.find(rule.block_start.as_str()) else {
			return outcome;
		};
		let after_start = begin + rule.block_start.len();
		let Some(end) = rest[after_start..].find(rule.block_end.as_str()) else {
			warn!(
				extension = %rule.extension,
				"block start without matching end token; rest of file skipped"
			);
			outcome.unterminated = true;
			return outcome;
		};
		let end = after_start + end;
		outcome.blocks.push(rest[after_start..end].to_string());
		rest = &rest[end + rule.block_end.len()..];
	}
}
