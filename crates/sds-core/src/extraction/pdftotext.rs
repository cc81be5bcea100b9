use std::io::Write;
use std::process::Command;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::SdsError;
use crate::extraction::{in_content_band, PageWords, WordExtractor, WordToken};

/// Word extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox`, which emits an XHTML document with one `<word>`
/// element per token carrying its bounding box, and `<page>` elements
/// carrying the page dimensions.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl WordExtractor for PdftotextExtractor {
    fn extract_words(&self, pdf_bytes: &[u8]) -> Result<Vec<PageWords>, SdsError> {
        // Write PDF bytes to a temp file; pdftotext needs a seekable input.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| SdsError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| SdsError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SdsError::PdftotextNotFound
                } else {
                    SdsError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(SdsError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        parse_bbox_xml(&xml)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse the `pdftotext -bbox` XHTML into per-page word lists, dropping
/// words outside the page's content band.
fn parse_bbox_xml(xml: &str) -> Result<Vec<PageWords>, SdsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<PageWords> = Vec::new();
    let mut pending_word: Option<WordToken> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SdsError::Extraction(format!("bad bbox xml: {}", e)))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"page" => {
                    pages.push(PageWords {
                        page_index: pages.len(),
                        width: attr_f32(e, b"width").unwrap_or(0.0),
                        height: attr_f32(e, b"height").unwrap_or(0.0),
                        words: Vec::new(),
                    });
                }
                b"word" => {
                    pending_word = Some(WordToken {
                        text: String::new(),
                        x0: attr_f32(e, b"xMin").unwrap_or(0.0),
                        y0: attr_f32(e, b"yMin").unwrap_or(0.0),
                        x1: attr_f32(e, b"xMax").unwrap_or(0.0),
                        y1: attr_f32(e, b"yMax").unwrap_or(0.0),
                        page_index: pages.len().saturating_sub(1),
                    });
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(word) = pending_word.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| SdsError::Extraction(format!("bad bbox xml: {}", e)))?;
                    word.text.push_str(text.trim());
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"word" {
                    if let (Some(word), Some(page)) = (pending_word.take(), pages.last_mut()) {
                        if !word.text.is_empty()
                            && in_content_band(word.y0, word.y1, page.height)
                        {
                            page.words.push(word);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f32(e: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            return std::str::from_utf8(&attr.value).ok()?.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
<doc>
  <page width="612.0" height="792.0">
    <word xMin="56.0" yMin="100.0" xMax="120.0" yMax="112.0">Hazards</word>
    <word xMin="124.0" yMin="100.5" xMax="200.0" yMax="112.0">identification</word>
    <word xMin="56.0" yMin="20.0" xMax="120.0" yMax="32.0">HeaderNoise</word>
    <word xMin="56.0" yMin="760.0" xMax="120.0" yMax="772.0">FooterNoise</word>
  </page>
  <page width="612.0" height="792.0">
  </page>
</doc>
</body>
</html>"#;

    #[test]
    fn parses_pages_and_words() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].height, 792.0);
        let texts: Vec<&str> = pages[0].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Hazards", "identification"]);
    }

    #[test]
    fn header_and_footer_words_are_dropped() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert!(pages[0].words.iter().all(|w| w.text != "HeaderNoise"));
        assert!(pages[0].words.iter().all(|w| w.text != "FooterNoise"));
    }

    #[test]
    fn empty_page_yields_no_words() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert!(pages[1].words.is_empty());
    }

    #[test]
    fn xml_entities_are_unescaped() {
        let xml = r#"<doc><page width="612.0" height="792.0">
            <word xMin="1" yMin="100" xMax="2" yMax="110">A&amp;B</word>
        </page></doc>"#;
        let pages = parse_bbox_xml(xml).unwrap();
        assert_eq!(pages[0].words[0].text, "A&B");
    }
}
