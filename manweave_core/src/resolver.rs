use tracing::warn;

use crate::context::RunContext;
use crate::record::MetadataRecord;

/// Resolve `{{key}}` placeholder tokens in `template` against the layered
/// lookup: the block's own record first, then the project properties, then
/// the built-in dynamic keys (`#date`, `#isodate`, `#hostname`) from the run
/// context.
///
/// The pass is single and left-to-right: resolved values are never
/// re-scanned, so substitution cannot recurse. A missing key resolves to the
/// empty string with a warning. An opening token without a closing token
/// stops substitution and passes the remaining text through unchanged.
pub fn resolve(record: &MetadataRecord, template: &str, ctx: &RunContext) -> String {
	let begin_token = ctx.placeholder_begin.as_str();
	let end_token = ctx.placeholder_end.as_str();
	if begin_token.is_empty() || end_token.is_empty() || !template.contains(begin_token) {
		return template.to_string();
	}

	let mut out = String::with_capacity(template.len());
	let mut rest = template;
	loop {
		let Some(begin) = rest.find(begin_token) else {
			break;
		};
		let after_begin = begin + begin_token.len();
		let Some(end) = rest[after_begin..].find(end_token) else {
			// Dangling open token: not an error, the remainder is literal.
			break;
		};
		out.push_str(&rest[..begin]);
		let key = &rest[after_begin..after_begin + end];
		rest = &rest[after_begin + end + end_token.len()..];

		match lookup(record, key, ctx) {
			Some(value) => out.push_str(&value),
			None => warn!(key, "placeholder key not found"),
		}
	}
	out.push_str(rest);
	out
}

/// Layered placeholder lookup. First hit wins.
fn lookup(record: &MetadataRecord, key: &str, ctx: &RunContext) -> Option<String> {
	if let Some(value) = record.get(key) {
		return Some(value.to_string());
	}
	if let Some(value) = ctx.properties.get(key) {
		return Some(value.clone());
	}
	match key {
		"#date" => Some(ctx.date_string()),
		"#isodate" => Some(ctx.iso_date()),
		"#hostname" => Some(ctx.hostname.clone()),
		_ => None,
	}
}
