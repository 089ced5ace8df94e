use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// The name of the JSON report written into the scanned folder
pub(crate) const RESULTS_FILE_NAME: &str = "webm-analysis-results.json";

/// The full report: one entry per file path, last write wins
pub(crate) type Results = BTreeMap<String, FileReport>;

/// The outcome of validating a single candidate file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileReport {
	/// The file's name, without its leading path
	#[serde(skip_serializing_if = "Option::is_none")]
	pub(crate) file_name: Option<String>,
	/// Whether the file starts with a well-formed EBML header
	pub(crate) is_valid: bool,
	/// Human-readable notes explaining the verdict
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub(crate) details: Vec<String>,
	/// Set when the file could not be read at all
	#[serde(skip_serializing_if = "Option::is_none")]
	pub(crate) error: Option<String>,
}

impl FileReport {
	pub(crate) fn valid(file_name: &str, detail: &str) -> Self {
		Self {
			file_name: Some(file_name.to_owned()),
			is_valid: true,
			details: vec![detail.to_owned()],
			error: None,
		}
	}

	pub(crate) fn invalid(file_name: &str, detail: &str) -> Self {
		Self {
			file_name: Some(file_name.to_owned()),
			is_valid: false,
			details: vec![detail.to_owned()],
			error: None,
		}
	}

	pub(crate) fn read_failure(err: std::io::Error) -> Self {
		Self {
			file_name: None,
			is_valid: false,
			details: Vec::new(),
			error: Some(err.to_string()),
		}
	}
}

/// Load the results of a previous run, if any.
///
/// A missing or unparseable report file is not an error; the scan simply
/// starts from an empty map.
pub(crate) fn load_existing(path: &Path) -> Results {
	match fs::read_to_string(path) {
		Ok(contents) => match serde_json::from_str(&contents) {
			Ok(results) => results,
			Err(err) => {
				log::warn!("Ignoring unparseable report {}: {err}", path.display());
				Results::new()
			},
		},
		Err(_) => Results::new(),
	}
}

/// Write the merged results back out, pretty-printed.
pub(crate) fn save(path: &Path, results: &Results) -> anyhow::Result<()> {
	let contents = serde_json::to_string_pretty(results)?;
	fs::write(path, contents)
		.with_context(|| format!("Failed to write report to {}", path.display()))?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::report::{self, FileReport, Results};

	#[test]
	fn report_serializes_with_camel_case_keys() {
		let report = FileReport::valid("clip.webm", "Valid EBML header found");
		let json = serde_json::to_string(&report).unwrap();

		assert_eq!(
			json,
			r#"{"fileName":"clip.webm","isValid":true,"details":["Valid EBML header found"]}"#
		);
	}

	#[test]
	fn read_failure_omits_empty_fields() {
		let report =
			FileReport::read_failure(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
		let json = serde_json::to_string(&report).unwrap();

		assert_eq!(json, r#"{"isValid":false,"error":"gone"}"#);
	}

	#[test]
	fn merge_is_last_write_wins() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(report::RESULTS_FILE_NAME);

		let mut results = Results::new();
		results.insert(
			"a.webm".to_owned(),
			FileReport::invalid("a.webm", "File too small to contain EBML header"),
		);
		results.insert(
			"b.webm".to_owned(),
			FileReport::valid("b.webm", "Valid EBML header found"),
		);
		report::save(&path, &results).unwrap();

		// A later run revisits only `a.webm`
		let mut reloaded = report::load_existing(&path);
		reloaded.insert(
			"a.webm".to_owned(),
			FileReport::valid("a.webm", "Valid EBML header found"),
		);
		report::save(&path, &reloaded).unwrap();

		let merged = report::load_existing(&path);
		assert_eq!(merged.len(), 2);
		assert!(merged["a.webm"].is_valid);
		assert!(merged["b.webm"].is_valid);
	}

	#[test]
	fn missing_report_starts_empty() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(report::RESULTS_FILE_NAME);

		assert!(report::load_existing(&path).is_empty());
	}

	#[test]
	fn unparseable_report_starts_empty() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(report::RESULTS_FILE_NAME);

		std::fs::write(&path, "{ not json").unwrap();
		assert!(report::load_existing(&path).is_empty());
	}
}
