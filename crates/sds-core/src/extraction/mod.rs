pub mod pdftotext;

use crate::error::SdsError;

/// Vertical band (in layout units from the page top) containing real content.
/// The running header above and footer below are excluded at the source; the
/// document families this engine handles stamp boilerplate in those zones.
pub const CONTENT_BAND_TOP: f32 = 60.0;
pub const CONTENT_BAND_BOTTOM_MARGIN: f32 = 50.0;

/// A single positioned word from a PDF page. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub page_index: usize,
}

/// All in-band words of one page, with the page's full pixel-space height
/// (needed by the clusterer's cross-page offset accumulator).
#[derive(Debug, Clone, Default)]
pub struct PageWords {
    pub page_index: usize,
    pub width: f32,
    pub height: f32,
    pub words: Vec<WordToken>,
}

/// Trait for word-level PDF extraction backends.
pub trait WordExtractor: Send + Sync {
    /// Extract positioned words from PDF bytes, one `PageWords` per page.
    /// An empty or malformed page yields an empty word list, not an error.
    fn extract_words(&self, pdf_bytes: &[u8]) -> Result<Vec<PageWords>, SdsError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Whether a word's box lies inside the page's content band.
pub fn in_content_band(y0: f32, y1: f32, page_height: f32) -> bool {
    y0 >= CONTENT_BAND_TOP && y1 <= page_height - CONTENT_BAND_BOTTOM_MARGIN
}
