use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use manweave_cli::Commands;
use manweave_cli::ManweaveCli;
use manweave_core::AnyEmptyResult;
use manweave_core::ManweaveConfig;
use manweave_core::ManweaveError;
use manweave_core::RunContext;
use manweave_core::run_collect;
use manweave_core::scan_tree;
use owo_colors::OwoColorize;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ManweaveCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Collect {
			ref output,
			cleanup,
			index,
			concat,
			ref properties,
		}) => run_collect_command(&args, output.as_deref(), cleanup, index, concat, properties),
		Some(Commands::List) => run_list(&args),
		Some(Commands::Init) => run_init(&args),
		None => {
			eprintln!("No subcommand specified. Run `manweave --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<ManweaveError>() {
			Ok(err) => {
				let report: miette::Report = (*err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn resolve_root(args: &ManweaveCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project config and anchor its relative paths at the project
/// root, so `--path` works from any working directory.
fn load_config(root: &Path) -> Result<ManweaveConfig, manweave_core::AnyError> {
	let mut config = ManweaveConfig::load(root)?.unwrap_or_default();
	config.root = anchor(root, &config.root);
	config.output = anchor(root, &config.output);
	Ok(config)
}

fn anchor(root: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else if path == Path::new(".") {
		root.to_path_buf()
	} else {
		root.join(path)
	}
}

fn parse_property(entry: &str) -> Result<(String, String), ManweaveError> {
	match entry.split_once('=') {
		Some((key, value)) if !key.trim().is_empty() => {
			Ok((key.trim().to_string(), value.trim().to_string()))
		}
		_ => Err(ManweaveError::InvalidProperty(entry.to_string())),
	}
}

fn run_collect_command(
	args: &ManweaveCli,
	output: Option<&Path>,
	cleanup: bool,
	index: bool,
	concat: bool,
	properties: &[String],
) -> AnyEmptyResult {
	let root = resolve_root(args);
	let mut config = load_config(&root)?;

	if let Some(output) = output {
		config.output = anchor(&root, output);
	}
	if cleanup {
		config.cleanup_output = true;
	}
	if index {
		config.index.enabled = true;
	}
	if concat {
		config.concat.enabled = true;
	}
	for entry in properties {
		let (key, value) = parse_property(entry)?;
		config.properties.insert(key, value);
	}

	let ctx = RunContext::new(&config);
	let report = run_collect(&config, &ctx)?;

	println!(
		"{}",
		colored!(
			format!(
				"Collected {} manual(s) from {} file(s) into {}",
				report.written.len(),
				report.scanned_files,
				config.output.display()
			),
			bold
		)
	);
	if report.dropped_blocks > 0 {
		println!(
			"{}",
			colored!(
				format!("{} block(s) dropped, see warnings above", report.dropped_blocks),
				yellow
			)
		);
	}
	if report.unterminated_files > 0 {
		println!(
			"{}",
			colored!(
				format!(
					"{} file(s) had a block start without an end token",
					report.unterminated_files
				),
				yellow
			)
		);
	}

	Ok(())
}

fn run_list(args: &ManweaveCli) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let listings = scan_tree(&config)?;

	if listings.is_empty() {
		println!("No manual blocks found.");
		return Ok(());
	}

	for listing in &listings {
		let category = if listing.category.is_empty() {
			"(no category)"
		} else {
			listing.category.as_str()
		};
		println!(
			"{category}/{}  {} {}",
			listing.ident,
			colored!("←", bold),
			listing.source.display()
		);
	}
	println!();
	println!(
		"{}",
		colored!(format!("{} block(s) found", listings.len()), bold)
	);

	Ok(())
}

fn run_init(args: &ManweaveCli) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config_path = root.join("manweave.toml");

	if config_path.exists() {
		println!("Config file already exists: {}", config_path.display());
		return Ok(());
	}

	let sample_config = "# manweave configuration\n\n# Where to look for annotated sources and \
	                     where to write manual pages.\n# root = \".\"\noutput = \
	                     \"manual\"\noutput_extension = \"adoc\"\n\n# Directory path suffixes that \
	                     mark scan roots.\nstart = [\"src\"]\n\n# Directory names pruned from \
	                     traversal.\nexclude = [\"bin\", \"target\", \"test\"]\n\n# Wrapped around \
	                     every rendered body; `\\n` becomes a newline and\n# {{placeholders}} are \
	                     resolved.\n# text_header = \"= {{category}}\\n\\n\"\n# text_footer = \
	                     \"\"\n\n[[file_types]]\nextension = \"rs\"\n# block_start = \"/*#\"\n# \
	                     block_end = \"*/\"\n# header_prefix = \"*#\"\n# line_prefix = \"*\"\n\n# \
	                     Per-category index files, built from the metadata \
	                     sidecars.\n[index]\nenabled = false\n# line = \
	                     \"include::{{_file}}[]\"\n\n# Values available to {{placeholders}} in \
	                     every block.\n[properties]\n# product = \"Example\"\n";

	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Annotate a source file with a manual block:");
	println!("     /*# guide man");
	println!("      *# title: Getting started");
	println!("      * First line of the manual body.");
	println!("      */");
	println!("  2. Run `manweave collect` to build the output tree");
	println!("  3. Run `manweave list` to audit discovered blocks");

	Ok(())
}
