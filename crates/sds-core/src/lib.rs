pub mod builder;
pub mod cluster;
pub mod codes;
pub mod error;
pub mod extraction;
pub mod height;
pub mod mode;
pub mod record;
pub mod section;

use cluster::ClusteredLine;
use error::SdsError;
use extraction::WordExtractor;
use mode::Mode;
use record::MsdsRecord;

/// Main API entry point: parse one safety data sheet PDF into a structured
/// record.
///
/// The mode selects the template family and language; section boundaries
/// and cleanup tables are fixed per mode, so parsing a sheet with the wrong
/// mode degrades to mostly-empty fields rather than failing.
pub fn parse_msds(
    pdf_bytes: &[u8],
    extractor: &dyn WordExtractor,
    mode: Mode,
) -> Result<MsdsRecord, SdsError> {
    let pages = extractor.extract_words(pdf_bytes)?;
    let lines = cluster::cluster_document(&pages);
    Ok(builder::build_record(&lines, mode))
}

/// Parse a batch of documents, one result per input in order.
///
/// Documents are fully independent: a document that fails to extract
/// records its error in place and never affects its neighbours.
pub fn parse_batch<'a, I>(
    documents: I,
    extractor: &dyn WordExtractor,
    mode: Mode,
) -> Vec<Result<MsdsRecord, SdsError>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    documents
        .into_iter()
        .map(|bytes| parse_msds(bytes, extractor, mode))
        .collect()
}

/// Parse from an already clustered line list. Exposed for callers that run
/// their own extraction front end.
pub fn parse_lines(lines: &[ClusteredLine], mode: Mode) -> MsdsRecord {
    builder::build_record(lines, mode)
}
