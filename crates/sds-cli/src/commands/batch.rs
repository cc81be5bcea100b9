use sds_core::error::SdsError;
use sds_core::extraction::pdftotext::PdftotextExtractor;
use sds_core::mode::Mode;
use std::path::PathBuf;

/// Parse every input independently; failures are reported per file and the
/// process exits with an error only if nothing succeeded.
pub fn run(input_files: Vec<PathBuf>, mode: &str, out_dir: Option<PathBuf>) -> Result<(), SdsError> {
    let mode = Mode::from_cli_name(mode)?;
    if input_files.is_empty() {
        return Err(SdsError::Extraction("no input files given".into()));
    }

    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let extractor = PdftotextExtractor::new();
    let mut failures = 0usize;

    for path in &input_files {
        let outcome = std::fs::read(path)
            .map_err(SdsError::from)
            .and_then(|bytes| sds_core::parse_msds(&bytes, &extractor, mode));

        match outcome {
            Ok(record) => {
                if let Some(dir) = &out_dir {
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "record".into());
                    let target = dir.join(format!("{stem}.json"));
                    std::fs::write(&target, serde_json::to_string_pretty(&record)?)?;
                    println!("{}: ok -> {}", path.display(), target.display());
                } else {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: error: {e}", path.display());
            }
        }
    }

    if failures == input_files.len() {
        return Err(SdsError::Extraction("all documents failed to parse".into()));
    }
    Ok(())
}
