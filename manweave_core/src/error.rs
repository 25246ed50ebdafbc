use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ManweaveError {
	#[error(transparent)]
	#[diagnostic(code(manweave::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(manweave::config_parse),
		help("check that manweave.toml is valid TOML; see `manweave init` for a starter file")
	)]
	ConfigParse(String),

	#[error("duplicate file type rule for extension `{0}`")]
	#[diagnostic(
		code(manweave::duplicate_file_type),
		help("each `[[file_types]]` entry must use a distinct extension")
	)]
	DuplicateFileType(String),

	#[error("root directory does not exist: `{0}`")]
	#[diagnostic(
		code(manweave::root_not_found),
		help("set `root` in manweave.toml or pass `--path` to point at the project root")
	)]
	RootNotFound(String),

	#[error("failed to clean output directory `{path}`: {reason}")]
	#[diagnostic(code(manweave::output_cleanup))]
	OutputCleanup { path: String, reason: String },

	#[error("failed to load metadata sidecar `{path}`: {reason}")]
	#[diagnostic(
		code(manweave::sidecar_parse),
		help("the sidecar was written by an earlier collect run; delete the output directory and collect again")
	)]
	SidecarParse { path: String, reason: String },

	#[error("invalid property override `{0}`")]
	#[diagnostic(
		code(manweave::invalid_property),
		help("property overrides use the form `key=value`")
	)]
	InvalidProperty(String),
}

pub type ManweaveResult<T> = Result<T, ManweaveError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
