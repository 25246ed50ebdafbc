use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::ManweaveError;
use crate::ManweaveResult;
use crate::config::ManweaveConfig;
use crate::config::normalize_template;
use crate::context::RunContext;
use crate::generate::generate_concat_files;
use crate::generate::generate_index_files;
use crate::parser::FileContext;
use crate::parser::ParseFailure;
use crate::parser::ParseOptions;
use crate::parser::ParsedBlock;
use crate::parser::parse_block;
use crate::record::KEY_CATEGORY;
use crate::record::KEY_FILE_IDENT;
use crate::resolver::resolve;
use crate::scanner::scan_blocks;
use crate::walker::SourceFile;
use crate::walker::collect_sources;
use crate::writer::write_manual;

/// Result of one full collect run.
#[derive(Debug, Default)]
pub struct CollectReport {
	/// Files that matched a rule and were scanned.
	pub scanned_files: usize,
	/// Manuals written, with their output paths.
	pub written: Vec<PathBuf>,
	/// Blocks dropped for any per-item reason (malformed header,
	/// unrecognized marker, missing category, write failure).
	pub dropped_blocks: usize,
	/// Files abandoned partway because a block start had no end token.
	pub unterminated_files: usize,
}

impl CollectReport {
	/// True when every discovered block produced a manual.
	pub fn is_clean(&self) -> bool {
		self.dropped_blocks == 0 && self.unterminated_files == 0
	}
}

/// One discovered block, as surfaced by [`scan_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockListing {
	pub category: String,
	pub ident: String,
	pub source: PathBuf,
}

/// Run the full pipeline: optional output cleanup, then walk → scan →
/// parse → resolve → write, then the index and concat phases.
///
/// The two phases are strictly sequential — the generators read only the
/// sidecars the scan phase persisted. Per-item failures degrade to a warning
/// and a skip; only invocation-level problems (invalid rule set, missing
/// root, output cleanup failure) abort the run.
pub fn run_collect(config: &ManweaveConfig, ctx: &RunContext) -> ManweaveResult<CollectReport> {
	config.validate()?;
	if !config.root.is_dir() {
		return Err(ManweaveError::RootNotFound(
			config.root.display().to_string(),
		));
	}

	if config.cleanup_output {
		cleanup_output(config)?;
	}

	let mut report = CollectReport::default();
	let mut written = Vec::new();
	visit_blocks(config, &mut report, |_source, parsed| {
		let rendered = resolve(&parsed.record, &parsed.body, ctx);
		match write_manual(
			&parsed.record,
			&rendered,
			&config.output,
			&config.output_extension,
		) {
			Ok(Some(path)) => {
				written.push(path);
				false
			}
			Ok(None) => true,
			Err(error) => {
				warn!(%error, "failed to write manual; continuing");
				true
			}
		}
	});
	report.written = written;

	if config.index.enabled {
		generate_index_files(config, ctx);
	}
	if config.concat.enabled {
		generate_concat_files(config, ctx);
	}

	Ok(report)
}

/// Walk and parse without writing anything: every block that would produce a
/// manual is returned as a listing. Blocks without a category are included —
/// the write phase is what drops them.
pub fn scan_tree(config: &ManweaveConfig) -> ManweaveResult<Vec<BlockListing>> {
	config.validate()?;
	if !config.root.is_dir() {
		return Err(ManweaveError::RootNotFound(
			config.root.display().to_string(),
		));
	}

	let mut listings = Vec::new();
	let mut report = CollectReport::default();
	visit_blocks(config, &mut report, |source, parsed| {
		listings.push(BlockListing {
			category: parsed.record.get_or(KEY_CATEGORY, "").to_string(),
			ident: parsed.record.get_or(KEY_FILE_IDENT, "").to_string(),
			source: source.path.clone(),
		});
		false
	});
	Ok(listings)
}

/// Shared scan-phase loop: feed every parsed block of every matched file to
/// `visit`. The callback returns `true` when it dropped the block, so the
/// report's counters stay accurate for both collect and list runs.
fn visit_blocks(
	config: &ManweaveConfig,
	report: &mut CollectReport,
	mut visit: impl FnMut(&SourceFile, ParsedBlock) -> bool,
) {
	let text_header = normalize_template(&config.text_header);
	let text_footer = normalize_template(&config.text_footer);
	let options = ParseOptions {
		text_header: &text_header,
		text_footer: &text_footer,
		block_markers: &config.block_markers,
	};

	let sources = collect_sources(&config.root, config);
	debug!(files = sources.len(), "scan phase starting");

	for source in &sources {
		let content = match std::fs::read_to_string(&source.path) {
			Ok(content) => content,
			Err(error) => {
				warn!(path = %source.path.display(), %error, "unreadable file; skipped");
				continue;
			}
		};
		report.scanned_files += 1;

		let rule = &config.file_types[source.rule_index];
		let outcome = scan_blocks(&content, rule);
		if outcome.unterminated {
			report.unterminated_files += 1;
		}

		let file_ctx = FileContext::new(&source.path, &source.start);
		for (block_index, raw) in outcome.blocks.iter().enumerate() {
			match parse_block(raw, &file_ctx, block_index, rule, &options) {
				Ok(parsed) => {
					if visit(source, parsed) {
						report.dropped_blocks += 1;
					}
				}
				Err(ParseFailure::MalformedHeader { line }) => {
					warn!(
						path = %source.path.display(),
						line = %line,
						"malformed block header line; block dropped"
					);
					report.dropped_blocks += 1;
				}
				Err(ParseFailure::UnrecognizedMarker { marker }) => {
					warn!(
						path = %source.path.display(),
						marker = %marker,
						"unrecognized block marker; block dropped"
					);
					report.dropped_blocks += 1;
				}
			}
		}
	}
}

/// Delete and recreate the output directory.
fn cleanup_output(config: &ManweaveConfig) -> ManweaveResult<()> {
	let output = &config.output;
	debug!(path = %output.display(), "cleaning output directory");
	if output.exists() {
		std::fs::remove_dir_all(output).map_err(|e| ManweaveError::OutputCleanup {
			path: output.display().to_string(),
			reason: e.to_string(),
		})?;
	}
	std::fs::create_dir_all(output).map_err(|e| ManweaveError::OutputCleanup {
		path: output.display().to_string(),
		reason: e.to_string(),
	})?;
	Ok(())
}
