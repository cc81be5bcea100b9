use sds_core::error::SdsError;
use sds_core::extraction::pdftotext::PdftotextExtractor;
use sds_core::mode::Mode;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    mode: &str,
    output_format: &str,
    out: Option<PathBuf>,
) -> Result<(), SdsError> {
    let mode = Mode::from_cli_name(mode)?;

    let pdf_bytes = std::fs::read(&input_file)?;
    let extractor = PdftotextExtractor::new();
    let record = sds_core::parse_msds(&pdf_bytes, &extractor, mode)?;

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json)?;
        eprintln!("Wrote {}", path.display());
    }

    match output_format {
        "json" => output::json::print(&record)?,
        _ => output::table::print(&record, mode),
    }

    Ok(())
}
