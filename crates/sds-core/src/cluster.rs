use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::extraction::{PageWords, WordToken};

/// A reconstructed visual text row.
///
/// `global_y0`/`global_y1` are the row's mean top/bottom offset by the
/// cumulative height of all preceding pages, giving a single page-ordered
/// coordinate usable for gap-based joining decisions across the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredLine {
    pub text: String,
    pub global_y0: f32,
    pub global_y1: f32,
}

/// Words whose vertical start is within this distance of the row's first
/// word belong to the same visual row.
const ROW_TOLERANCE: f32 = 8.0;

/// Boilerplate recurring outside the header/footer band in this document
/// family: page-number footers, document titles in both languages,
/// version/date stamps, company letterhead, product-name labels. A line
/// matching any pattern is dropped whole.
static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\s*\d+\s*/\s*\d+\s*$",
        r"물질안전보건자료",
        r"Material Safety Data Sheet",
        r"PAGE",
        r"Ver\.\s*:?\s*\d+\.?\d*",
        r"발행일\s*:?.*",
        r"Date of issue",
        r"주식회사\s*고려.*",
        r"Cff",
        r"Corea\s*flavors.*",
        r"제\s*품\s*명\s*:?.*",
        r"according to the Global Harmonized System",
        r"Product Name",
        r"Date\s*:\s*\d{2}\.[a-zA-Z]{3}\.\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid noise pattern"))
    .collect()
});

/// Whether a concatenated row matches one of the boilerplate patterns.
pub fn is_noise(line_text: &str) -> bool {
    NOISE_PATTERNS.iter().any(|re| re.is_match(line_text))
}

/// Cluster every page's words into visual lines with document-global
/// vertical offsets.
///
/// The offset accumulator advances by each page's full height rather than
/// its content height; line order stays stable across page breaks even
/// though absolute gap magnitudes lose precision there, and the gap-based
/// joining rules downstream tolerate that.
pub fn cluster_document(pages: &[PageWords]) -> Vec<ClusteredLine> {
    let mut lines = Vec::new();
    let mut y_offset = 0.0f32;
    for page in pages {
        cluster_page(&page.words, y_offset, &mut lines);
        y_offset += page.height;
    }
    lines
}

/// Single top-to-bottom sweep over one page's words: sort by y0, group rows
/// by vertical proximity to the row's first word, order each row by x0 and
/// join with single spaces. Noise rows are discarded before retention.
fn cluster_page(words: &[WordToken], y_offset: f32, out: &mut Vec<ClusteredLine>) {
    if words.is_empty() {
        return;
    }

    let mut sorted: Vec<&WordToken> = words.iter().collect();
    sorted.sort_by(|a, b| a.y0.partial_cmp(&b.y0).unwrap_or(Ordering::Equal));

    let mut rows: Vec<Vec<&WordToken>> = Vec::new();
    let mut current_row = vec![sorted[0]];
    let mut row_base_y = sorted[0].y0;
    for &word in &sorted[1..] {
        if (word.y0 - row_base_y).abs() < ROW_TOLERANCE {
            current_row.push(word);
        } else {
            rows.push(std::mem::take(&mut current_row));
            current_row.push(word);
            row_base_y = word.y0;
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    for mut row in rows {
        row.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal));
        let text = row
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if is_noise(&text) {
            continue;
        }
        let n = row.len() as f32;
        let avg_y0 = row.iter().map(|w| w.y0).sum::<f32>() / n;
        let avg_y1 = row.iter().map(|w| w.y1).sum::<f32>() / n;
        out.push(ClusteredLine {
            text,
            global_y0: avg_y0 + y_offset,
            global_y1: avg_y1 + y_offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f32, y0: f32) -> WordToken {
        WordToken {
            text: text.to_string(),
            x0,
            y0,
            x1: x0 + 10.0,
            y1: y0 + 10.0,
            page_index: 0,
        }
    }

    fn page(height: f32, words: Vec<WordToken>) -> PageWords {
        PageWords {
            page_index: 0,
            width: 612.0,
            height,
            words,
        }
    }

    #[test]
    fn words_within_tolerance_form_one_row() {
        let pages = vec![page(
            792.0,
            vec![
                word("identification", 120.0, 102.0),
                word("Hazards", 50.0, 100.0),
                word("2.", 10.0, 104.0),
            ],
        )];
        let lines = cluster_document(&pages);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "2. Hazards identification");
    }

    #[test]
    fn distant_rows_are_split() {
        let pages = vec![page(
            792.0,
            vec![word("first", 10.0, 100.0), word("second", 10.0, 120.0)],
        )];
        let lines = cluster_document(&pages);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn offset_accumulates_full_page_height() {
        let pages = vec![
            page(792.0, vec![word("page1", 10.0, 100.0)]),
            page(792.0, vec![word("page2", 10.0, 100.0)]),
        ];
        let lines = cluster_document(&pages);
        assert_eq!(lines.len(), 2);
        assert!((lines[1].global_y0 - (100.0 + 792.0)).abs() < 0.01);
        assert!(lines[1].global_y0 > lines[0].global_y1);
    }

    #[test]
    fn empty_page_contributes_no_lines_but_advances_offset() {
        let pages = vec![
            page(792.0, vec![]),
            page(792.0, vec![word("only", 10.0, 100.0)]),
        ];
        let lines = cluster_document(&pages);
        assert_eq!(lines.len(), 1);
        assert!((lines[0].global_y0 - 892.0).abs() < 0.01);
    }

    #[test]
    fn noise_lines_are_dropped_whole() {
        assert!(is_noise("3 / 12"));
        assert!(is_noise("Material Safety Data Sheet"));
        assert!(is_noise("material safety data sheet"));
        assert!(is_noise("물질안전보건자료"));
        assert!(is_noise("Ver. : 2.1"));
        assert!(!is_noise("Category 3 Skin irritation"));

        let pages = vec![page(
            792.0,
            vec![word("1", 10.0, 700.0), word("/", 22.0, 700.0), word("3", 34.0, 700.0)],
        )];
        assert!(cluster_document(&pages).is_empty());
    }
}
