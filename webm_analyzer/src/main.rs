//! A folder-level WebM validity scanner
//!
//! Walks a folder for `.webm` files, checks each one for a well-formed EBML
//! header, and merges the outcomes into a JSON report inside that folder.

use std::path::PathBuf;

use clap::Parser;

mod analyzer;
mod report;

#[derive(Debug, Parser)]
struct Cli {
	/// The folder to scan for `.webm` files.
	///
	/// The report is written to `webm-analysis-results.json` inside this
	/// folder. If a report from an earlier run exists, its entries are kept
	/// and only revisited files are overwritten.
	#[arg(default_value = ".")]
	folder: PathBuf,
}

fn main() -> anyhow::Result<()> {
	env_logger::init();

	let cli = Cli::parse();
	let output_path = analyzer::analyze_folder(&cli.folder)?;

	println!("Analysis complete. Results saved to {}", output_path.display());
	Ok(())
}
