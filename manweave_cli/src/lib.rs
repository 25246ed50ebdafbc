use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Collect manual pages from comment blocks in your source tree.",
	long_about = "manweave harvests structured documentation blocks embedded in source file \
	              comments and renders each one into a standalone manual page, organized by \
	              category.\n\nAnnotate source files with delimited blocks (by default `/*#` … \
	              `*/`), give each block a category and optional metadata, and run `manweave \
	              collect` to build the output tree.\n\nQuick start:\n  manweave init     Create a \
	              starter manweave.toml\n  manweave collect  Extract blocks and write manual \
	              pages\n  manweave list     Show every block without writing anything"
)]
pub struct ManweaveCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Extract manual blocks and write the category-organized output tree.
	///
	/// Walks the configured start directories under the project root, scans
	/// every file matching a file type rule, and writes one manual page plus
	/// a metadata sidecar per block. With `--index` or `--concat` (or the
	/// matching config settings) per-category index and concatenated
	/// documents are generated afterwards from the persisted sidecars.
	Collect {
		/// Override the configured output directory.
		#[arg(long)]
		output: Option<PathBuf>,

		/// Delete and recreate the output directory before scanning.
		#[arg(long, default_value_t = false)]
		cleanup: bool,

		/// Generate an index file in every category directory.
		#[arg(long, default_value_t = false)]
		index: bool,

		/// Generate a concatenated document in every category directory.
		#[arg(long, default_value_t = false)]
		concat: bool,

		/// Additional project property as `key=value`. May be repeated;
		/// overrides values from the `[properties]` config section.
		#[arg(long = "property", value_name = "KEY=VALUE")]
		properties: Vec<String>,
	},
	/// List every manual block in the project without writing output.
	///
	/// Prints one line per discovered block with its category, ident, and
	/// source file. Useful for auditing coverage before a collect run.
	List,
	/// Initialize manweave in a project by creating a starter config file.
	///
	/// Writes a commented `manweave.toml` to the project root. If the file
	/// already exists, this command is a no-op and exits successfully.
	Init,
}
