//! Row-height estimation for the downstream spreadsheet writer.
//!
//! Heights are in spreadsheet row units and follow the template's font
//! metrics: the step tables were calibrated against the rendered forms, so
//! they are data, not derived values.

use regex::Regex;
use std::sync::LazyLock;

use crate::mode::Mode;

const MIN_DETAIL_HEIGHT: f32 = 24.0;
const EMPTY_HEIGHT: f32 = 19.2;

/// Greedy word-wrap line count for Latin text at `char_limit` columns.
fn wrapped_line_count(paragraph: &str, char_limit: usize) -> usize {
    if paragraph.is_empty() {
        return 1;
    }
    let mut lines = 1;
    let mut current = 0usize;
    for word in paragraph.split(' ') {
        let len = word.chars().count();
        if current == 0 {
            current = len;
        } else if current + 1 + len <= char_limit {
            current += 1 + len;
        } else {
            lines += 1;
            current = len;
        }
    }
    lines
}

fn latin_visual_lines(text: &str, char_limit: usize) -> usize {
    text.split('\n')
        .map(|line| wrapped_line_count(line, char_limit))
        .sum()
}

/// Estimated row height for a plain record field.
pub fn basic_row_height(text: &str, mode: Mode) -> f32 {
    if text.is_empty() {
        return EMPTY_HEIGHT;
    }
    if mode.is_english() {
        match latin_visual_lines(text, 65) {
            0 | 1 => 18.75,
            2 => 25.5,
            3 => 36.0,
            4 => 44.0,
            5 => 54.0,
            n => 64.0 + (n - 6) as f32 * 10.0,
        }
    } else {
        let visual: usize = text
            .split('\n')
            .map(|line| {
                let len = line.chars().count();
                if len == 0 {
                    1
                } else {
                    len.div_ceil(45)
                }
            })
            .sum();
        match visual {
            0 | 1 => EMPTY_HEIGHT,
            2 => 26.0,
            3 => 36.0,
            _ => 45.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Section 4-7 detail formatting
// ---------------------------------------------------------------------------

/// Imperative sentence openers used by the English first-aid and handling
/// boilerplate. A wrapped sentence restarts on one of these.
static SENTENCE_OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let keywords = "IF|If|Get|When|Wash|Remove|Take|Prevent|Call|Move|Settle|Please|After|\
                    Should|Rescuer|For|Do|Wipe|Follow|Stop|Collect|Make|Absorb|Put|Since|\
                    Contaminated|Without|Empty|Keep|Store|The|It|Some|During|Containers";
    Regex::new(&format!(r"([a-z0-9)\].;])\s+((?:{keywords})\b)")).expect("valid pattern")
});

static PERIOD_BEFORE_CAPITAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Z])").expect("valid pattern"));

fn trim_joined_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn format_latin_detail(text: &str) -> (String, f32) {
    let formatted = SENTENCE_OPENER_RE.replace_all(text, "$1\n$2");
    let formatted = PERIOD_BEFORE_CAPITAL_RE.replace_all(&formatted, ".\n$1");
    // "Follow Stop valve" is one instruction, not two sentences.
    let formatted = formatted.replace("Follow\nStop", "Follow Stop");

    let lines = trim_joined_lines(&formatted);
    let visual: usize = lines.iter().map(|l| wrapped_line_count(l, 73)).sum();
    let height = (visual.max(1) as f32 * 12.0).max(MIN_DETAIL_HEIGHT);
    (lines.join("\n"), height)
}

/// Insert a break after each sentence-final period. A period flanked by
/// digits is a decimal point and never splits.
fn break_korean_sentences(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c == '.' {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next = chars.get(i + 1);
            let next_blocks = matches!(next, Some(n) if n.is_ascii_digit() || *n == '\n');
            if !prev_digit && !next_blocks {
                out.push('\n');
            }
        }
    }
    out
}

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

fn format_korean_detail(text: &str) -> (String, f32) {
    let lines = trim_joined_lines(&break_korean_sentences(text));

    // Hangul glyphs render roughly double width in the template font.
    let visual: usize = lines
        .iter()
        .map(|line| {
            let width: f32 = line.chars().map(|c| if is_hangul(c) { 2.0 } else { 1.1 }).sum();
            ((width / 90.0).ceil() as usize).max(1)
        })
        .sum();
    let height = (visual.max(1) as f32 * 10.0 + 10.0).max(MIN_DETAIL_HEIGHT);
    (lines.join("\n"), height)
}

/// Reflow a section 4-7 detail text into one instruction per line and
/// estimate its row height.
pub fn format_detail_text(text: &str, mode: Mode) -> (String, f32) {
    if text.is_empty() {
        return (String::new(), EMPTY_HEIGHT);
    }
    if mode.is_english() {
        format_latin_detail(text)
    } else {
        format_korean_detail(text)
    }
}
