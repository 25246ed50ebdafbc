use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Local;

use crate::config::ManweaveConfig;

/// Run-scoped values captured once per invocation and threaded through the
/// pipeline as an explicit parameter.
///
/// The timestamp is captured at construction so every `{{#date}}` and
/// `{{#isodate}}` substitution within a run yields the same string; the
/// hostname is resolved once for the same reason.
#[derive(Debug, Clone)]
pub struct RunContext {
	/// Instant the run started, in local time.
	pub started_at: DateTime<Local>,
	/// Host the run executes on.
	pub hostname: String,
	/// Project-level placeholder values.
	pub properties: BTreeMap<String, String>,
	/// Opening placeholder token.
	pub placeholder_begin: String,
	/// Closing placeholder token.
	pub placeholder_end: String,
}

impl RunContext {
	/// Capture a fresh context for one run of the given configuration.
	pub fn new(config: &ManweaveConfig) -> Self {
		Self {
			started_at: Local::now(),
			hostname: resolve_hostname(),
			properties: config.properties.clone(),
			placeholder_begin: config.placeholder_begin.clone(),
			placeholder_end: config.placeholder_end.clone(),
		}
	}

	/// The `{{#date}}` value: the captured start instant as a local
	/// timestamp string.
	pub fn date_string(&self) -> String {
		self.started_at.format("%a %b %e %H:%M:%S %Y").to_string()
	}

	/// The `{{#isodate}}` value: the ISO-8601 date of the captured start
	/// instant.
	pub fn iso_date(&self) -> String {
		self.started_at.format("%Y-%m-%d").to_string()
	}
}

fn resolve_hostname() -> String {
	std::env::var("HOSTNAME")
		.or_else(|_| std::env::var("HOST"))
		.unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
impl RunContext {
	/// A context with fixed properties and default delimiters, for tests.
	pub(crate) fn for_tests(properties: &[(&str, &str)]) -> Self {
		let mut config = ManweaveConfig::default();
		for (key, value) in properties {
			config
				.properties
				.insert((*key).to_string(), (*value).to_string());
		}
		Self::new(&config)
	}
}
