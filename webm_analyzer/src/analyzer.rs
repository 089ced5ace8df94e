use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use ebml_vint::{EBML_ID, ElementId, VInt};
use walkdir::WalkDir;

use crate::report::{self, FileReport};

/// Validate the EBML header at the start of a candidate file's bytes.
///
/// This is a shallow check: the file must open with the EBML master element ID
/// (`0x1A45DFA3`) followed by a decodable size vint. No child elements are
/// inspected.
pub(crate) fn analyze_chunk(buf: &[u8], file_name: &str) -> FileReport {
	if buf.len() < 4 {
		return FileReport::invalid(file_name, "File too small to contain EBML header");
	}

	let Ok((id, id_length)) = ElementId::parse(buf, 0) else {
		// No decodable ID vint; report the leading bytes as read
		let raw = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
		return FileReport::invalid(file_name, &format!("Invalid EBML header ID: {raw:x}"));
	};

	if id != EBML_ID {
		return FileReport::invalid(file_name, &format!("Invalid EBML header ID: {id:x}"));
	}

	if VInt::parse(buf, usize::from(id_length)).is_err() {
		return FileReport::invalid(file_name, "Invalid EBML header size");
	}

	FileReport::valid(file_name, "Valid EBML header found")
}

/// Analyze every `.webm` file directly inside `folder` and merge the outcomes
/// into the folder's JSON report.
///
/// Returns the path the report was written to.
pub(crate) fn analyze_folder(folder: &Path) -> anyhow::Result<PathBuf> {
	let output_path = folder.join(report::RESULTS_FILE_NAME);

	// Keep results from previous runs, overwriting only revisited files
	let mut results = report::load_existing(&output_path);

	log::info!("Scanning {} for .webm files", folder.display());

	for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
		let entry = entry.with_context(|| format!("Failed to read folder {}", folder.display()))?;
		if !entry.file_type().is_file() || !has_webm_extension(entry.path()) {
			continue;
		}

		let path_key = entry.path().display().to_string();
		let file_name = entry.file_name().to_string_lossy();
		log::debug!("Analyzing {path_key}");

		let file_report = match fs::read(entry.path()) {
			Ok(bytes) => analyze_chunk(&bytes, &file_name),
			Err(err) => {
				log::warn!("Failed to read {path_key}: {err}");
				FileReport::read_failure(err)
			},
		};

		results.insert(path_key, file_report);
	}

	report::save(&output_path, &results)?;
	Ok(output_path)
}

fn has_webm_extension(path: &Path) -> bool {
	path.extension()
		.is_some_and(|ext| ext.eq_ignore_ascii_case("webm"))
}
