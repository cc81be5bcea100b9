//! Keyword-bounded section extraction and text reconstruction.
//!
//! Sections are located by scanning clustered lines for a start keyword and
//! the first following end keyword, comparing space-stripped text so that
//! erratic intra-word spacing in the source layout cannot break a match.
//! The lines inside the span then go through garbage-header stripping and
//! a language-specific joining pass that rebuilds prose from visual rows.

use regex::Regex;
use std::sync::LazyLock;

use crate::cluster::ClusteredLine;
use crate::mode::{JoinStyle, Mode};

// ---------------------------------------------------------------------------
// Keyword location
// ---------------------------------------------------------------------------

fn nospace(s: &str) -> String {
    s.replace(' ', "")
}

/// Whether `haystack` contains `needle` after both are space-stripped,
/// case-insensitively for English dialects.
pub fn contains_keyword(haystack: &str, needle: &str, mode: Mode) -> bool {
    let h = nospace(haystack);
    let n = nospace(needle);
    if mode.config().case_insensitive_keywords {
        h.to_lowercase().contains(&n.to_lowercase())
    } else {
        h.contains(&n)
    }
}

/// Index of the first line at or after `from` matching any of `keywords`.
pub fn find_line(
    lines: &[ClusteredLine],
    keywords: &[&str],
    from: usize,
    mode: Mode,
) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| keywords.iter().any(|kw| contains_keyword(&line.text, kw, mode)))
        .map(|(i, _)| i)
}

/// Anchored keyword pattern with flexible inter-word whitespace, always
/// case-insensitive. Used to cut the keyword itself out of its own line.
fn keyword_regex(kw: &str) -> Regex {
    let body = regex::escape(kw).replace(' ', r"\s*");
    Regex::new(&format!("(?i){body}")).expect("escaped keyword is a valid pattern")
}

// ---------------------------------------------------------------------------
// Garbage-header stripping
// ---------------------------------------------------------------------------

struct HeadPattern {
    /// Lowercased, space-stripped form used for the cheap prefix test.
    nospace_lower: String,
    /// Lowercased literal used by the fallback strip.
    lower: String,
    char_len: usize,
    /// Anchored flexible-whitespace form that also eats trailing `[\s.:]`.
    re: Regex,
}

fn compile_heads(heads: &[&str]) -> Vec<HeadPattern> {
    heads
        .iter()
        .map(|gb| {
            let body = regex::escape(gb).replace(' ', r"\s*");
            HeadPattern {
                nospace_lower: nospace(gb).to_lowercase(),
                lower: gb.to_lowercase(),
                char_len: gb.chars().count(),
                re: Regex::new(&format!(r"(?i)^{body}[\s.:]*"))
                    .expect("escaped garbage head is a valid pattern"),
            }
        })
        .collect()
}

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid sensitive-head pattern"))
        .collect()
}

static CFF_KO_HEADS: LazyLock<Vec<HeadPattern>> =
    LazyLock::new(|| compile_heads(Mode::CffKo.config().garbage_heads));
static CFF_EN_HEADS: LazyLock<Vec<HeadPattern>> =
    LazyLock::new(|| compile_heads(Mode::CffEn.config().garbage_heads));
static HP_KO_HEADS: LazyLock<Vec<HeadPattern>> =
    LazyLock::new(|| compile_heads(Mode::HpKo.config().garbage_heads));
static HP_EN_HEADS: LazyLock<Vec<HeadPattern>> =
    LazyLock::new(|| compile_heads(Mode::HpEn.config().garbage_heads));

static KO_SENSITIVE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_patterns(Mode::HpKo.config().sensitive_heads));

static LEADING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[:.)\s]+").expect("valid pattern"));
static LEADING_PUNCT_AFTER_KW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[:.\-\s]+").expect("valid pattern"));
static LEADING_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*").expect("valid pattern"));

fn head_patterns(mode: Mode) -> &'static [HeadPattern] {
    match mode {
        Mode::CffKo => &CFF_KO_HEADS,
        Mode::CffEn => &CFF_EN_HEADS,
        Mode::HpKo => &HP_KO_HEADS,
        Mode::HpEn => &HP_EN_HEADS,
    }
}

fn sensitive_patterns(mode: Mode) -> &'static [Regex] {
    if mode.config().sensitive_heads.is_empty() {
        &[]
    } else {
        &KO_SENSITIVE
    }
}

/// Strip leaked sub-header labels from the start of one section line.
///
/// Runs at most three passes; each pass tries every known label against the
/// line head (space-insensitively), removes the first match it can, clears
/// bare connective leftovers, then trims leading punctuation. Converges in
/// at most three passes even on lines stacking several labels.
pub fn strip_garbage_heads(text: &str, mode: Mode) -> String {
    let cfg = mode.config();
    let mut txt = text.trim().to_string();
    if cfg.strip_leading_dash {
        txt = LEADING_DASH.replace(&txt, "").trim().to_string();
    }

    for _ in 0..3 {
        let mut changed = false;
        for head in head_patterns(mode) {
            if nospace(&txt).to_lowercase().starts_with(&head.nospace_lower) {
                if let Some(m) = head.re.find(&txt) {
                    txt = txt[m.end()..].trim().to_string();
                    changed = true;
                } else if txt.to_lowercase().starts_with(&head.lower) {
                    txt = txt.chars().skip(head.char_len).collect::<String>();
                    txt = txt.trim().to_string();
                    changed = true;
                }
            }
        }
        for pat in sensitive_patterns(mode) {
            if let Some(m) = pat.find(&txt) {
                txt = txt[m.end()..].trim().to_string();
                changed = true;
            }
        }
        txt = LEADING_PUNCT.replace(&txt, "").to_string();
        if !changed {
            break;
        }
    }

    if cfg.strip_leading_dash {
        txt = LEADING_DASH.replace(&txt, "").trim().to_string();
    }
    txt
}

// ---------------------------------------------------------------------------
// Line joining
// ---------------------------------------------------------------------------

/// Vertical gap at or above which two rows are treated as separate
/// paragraphs rather than one wrapped line.
const PARAGRAPH_GAP: f32 = 3.0;

static LATIN_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-|•|\*|\d+\.)").expect("valid pattern"));
static KO_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-|•|\*|\d+\.|[가-하]\.|\(\d+\))").expect("valid pattern"));
static KO_SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.|시오|음|함|것|임|있음|주의|금지|참조|따르시오|마시오)$").expect("valid pattern")
});

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Particles after which a line break in the source was a word boundary.
fn hangul_break_needs_space(last: char, curr: &str) -> bool {
    const BOUNDARY_PARTICLES: &[char] = &[
        '을', '를', '이', '가', '은', '는', '의', '와', '과', '에', '로', '서',
    ];
    const CONNECTIVES: &[char] = &[
        '고', '며', '여', '해', '나', '면', '니', '등', '및', ',', ')', '속',
    ];
    BOUNDARY_PARTICLES.contains(&last)
        || CONNECTIVES.contains(&last)
        || ["및", "또는", "(", "참고"].iter().any(|p| curr.starts_with(p))
}

/// Join cleaned lines back into prose according to the dialect's style.
pub fn join_lines(lines: &[ClusteredLine], style: JoinStyle) -> String {
    let Some(first) = lines.first() else {
        return String::new();
    };
    let mut out = first.text.clone();
    for pair in lines.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let prev_txt = prev.text.trim();
        let curr_txt = curr.text.trim();
        let gap = curr.global_y0 - prev.global_y1;

        let sep = match style {
            JoinStyle::Latin => {
                if LATIN_BULLET.is_match(curr_txt) || gap >= PARAGRAPH_GAP {
                    "\n"
                } else {
                    " "
                }
            }
            JoinStyle::Korean => {
                if KO_SENTENCE_END.is_match(prev_txt) || KO_BULLET.is_match(curr_txt) {
                    "\n"
                } else if gap >= PARAGRAPH_GAP {
                    "\n"
                } else {
                    let last = prev_txt.chars().last();
                    let first = curr_txt.chars().next();
                    match (last, first) {
                        (Some(l), Some(f)) if is_hangul(l) && is_hangul(f) => {
                            if hangul_break_needs_space(l, curr_txt) {
                                " "
                            } else {
                                ""
                            }
                        }
                        _ => " ",
                    }
                }
            }
        };
        out.push_str(sep);
        out.push_str(curr_txt);
    }
    out
}

// ---------------------------------------------------------------------------
// Section extraction
// ---------------------------------------------------------------------------

/// Extract the prose between `start_kw` and the first of `end_kws`.
///
/// The start line itself is kept with the keyword (and any separator
/// punctuation after it) cut out; if nothing of it survives, the span
/// begins at the next line. A missing start keyword yields `""`, a missing
/// end keyword extends the span to the end of the document.
pub fn extract_section(
    lines: &[ClusteredLine],
    start_kw: &str,
    end_kws: &[&str],
    mode: Mode,
) -> String {
    let Some(start_idx) = find_line(lines, &[start_kw], 0, mode) else {
        return String::new();
    };
    let end_idx = find_line(lines, end_kws, start_idx + 1, mode).unwrap_or(lines.len());

    let span = &lines[start_idx..end_idx];
    let Some((first, rest)) = span.split_first() else {
        return String::new();
    };

    let mut first = first.clone();
    first.text = match keyword_regex(start_kw).find(&first.text) {
        Some(m) => {
            let tail = first.text[m.end()..].trim();
            LEADING_PUNCT_AFTER_KW.replace(tail, "").to_string()
        }
        None => match first.text.split_once(start_kw) {
            Some((_, tail)) => tail.trim().to_string(),
            None => String::new(),
        },
    };

    let mut cleaned: Vec<ClusteredLine> = Vec::with_capacity(span.len());
    let raw = if first.text.trim().is_empty() {
        rest.to_vec()
    } else {
        std::iter::once(first).chain(rest.iter().cloned()).collect()
    };
    for mut line in raw {
        line.text = strip_garbage_heads(&line.text, mode);
        if !line.text.is_empty() {
            cleaned.push(line);
        }
    }

    join_lines(&cleaned, mode.config().join)
}

// ---------------------------------------------------------------------------
// HP Korean exposure sub-format
// ---------------------------------------------------------------------------

/// Parse the dash-itemized `label : value` exposure text of HP Korean
/// sheets. Items whose value is "해당없음" (not applicable) are dropped;
/// square brackets are noise from the template. An empty result collapses
/// to "자료없음" (no data).
pub fn parse_exposure_items(text: &str) -> String {
    const NOT_APPLICABLE: &str = "해당없음";
    const NO_DATA: &str = "자료없음";

    if text.is_empty() {
        return NO_DATA.to_string();
    }
    let mut items = Vec::new();
    for chunk in text.split('-') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        match chunk.split_once(':') {
            Some((name, value)) => {
                if value.contains(NOT_APPLICABLE) {
                    continue;
                }
                let name = name.trim().replace(['[', ']'], "");
                let value = value.trim().replace(['[', ']'], "");
                items.push(format!("{} : {}", name.trim(), value.trim()));
            }
            None => {
                if !chunk.contains(NOT_APPLICABLE) {
                    items.push(chunk.replace(['[', ']'], "").trim().to_string());
                }
            }
        }
    }
    if items.is_empty() {
        NO_DATA.to_string()
    } else {
        items.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y0: f32) -> ClusteredLine {
        ClusteredLine {
            text: text.to_string(),
            global_y0: y0,
            global_y1: y0 + 10.0,
        }
    }

    /// Lines with a ~1.5 gap between consecutive rows.
    fn tight(texts: &[&str]) -> Vec<ClusteredLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| line(t, i as f32 * 11.5))
            .collect()
    }

    // --- keyword location ---

    #[test]
    fn keyword_match_ignores_internal_spacing() {
        assert!(contains_keyword("Signal w ord : Danger", "Signal word", Mode::HpEn));
        assert!(contains_keyword("signal word", "Signal word", Mode::HpEn));
        assert!(!contains_keyword("signal word", "Signal word", Mode::HpKo));
        assert!(contains_keyword("유 해 성", "유해성", Mode::HpKo));
    }

    #[test]
    fn missing_start_keyword_yields_empty() {
        let lines = tight(&["unrelated text"]);
        assert_eq!(extract_section(&lines, "Signal word", &["Hazard"], Mode::HpEn), "");
    }

    #[test]
    fn missing_end_keyword_extends_to_document_end() {
        let lines = tight(&["Signal word : Danger", "continues here"]);
        let text = extract_section(&lines, "Signal word", &["No such end"], Mode::HpEn);
        assert_eq!(text, "Danger continues here");
    }

    #[test]
    fn first_of_several_end_keywords_wins() {
        let lines = tight(&[
            "A. GHS Classification",
            "Flammable liquid Category 3",
            "B. GHS label elements",
            "more",
        ]);
        let text = extract_section(
            &lines,
            "A. GHS Classification",
            &["C. Other", "B. GHS label elements"],
            Mode::HpEn,
        );
        assert_eq!(text, "Flammable liquid Category 3");
    }

    #[test]
    fn start_line_keeps_trailing_content() {
        let lines = tight(&["Signal word : - Danger", "Hazard statement"]);
        let text = extract_section(&lines, "Signal word", &["Hazard statement"], Mode::HpEn);
        assert_eq!(text, "Danger");
    }

    // --- garbage stripping ---

    #[test]
    fn stacked_labels_need_at_most_three_passes() {
        let stripped = strip_garbage_heads("Response Storage Disposal keep cool", Mode::HpEn);
        assert_eq!(stripped, "keep cool");
        // A fourth application changes nothing.
        assert_eq!(strip_garbage_heads(&stripped, Mode::HpEn), stripped);
    }

    #[test]
    fn label_matches_despite_spacing_and_case() {
        assert_eq!(
            strip_garbage_heads("signal  word : Danger", Mode::CffEn),
            "Danger"
        );
    }

    #[test]
    fn korean_connective_leftovers_are_cleared() {
        assert_eq!(strip_garbage_heads("시 착용할 보호구 장갑 착용", Mode::HpKo), "장갑 착용");
        assert_eq!(strip_garbage_heads("또는 보안경 착용", Mode::HpKo), "보안경 착용");
    }

    #[test]
    fn hp_korean_strips_item_dashes() {
        assert_eq!(strip_garbage_heads("- 물로 씻어내시오", Mode::HpKo), "물로 씻어내시오");
        assert_eq!(strip_garbage_heads("- 물로 씻어내시오", Mode::CffKo), "- 물로 씻어내시오");
    }

    #[test]
    fn clean_line_is_untouched() {
        assert_eq!(
            strip_garbage_heads("Keep away from heat", Mode::HpEn),
            "Keep away from heat"
        );
    }

    // --- joining ---

    #[test]
    fn latin_wrapped_lines_join_with_space() {
        let lines = tight(&["Wash with plenty of", "soap and water"]);
        assert_eq!(
            join_lines(&lines, JoinStyle::Latin),
            "Wash with plenty of soap and water"
        );
    }

    #[test]
    fn latin_bullets_and_gaps_break_lines() {
        let mut lines = tight(&["First statement", "- bulleted item"]);
        assert_eq!(
            join_lines(&lines, JoinStyle::Latin),
            "First statement\n- bulleted item"
        );
        lines = vec![line("para one", 0.0), line("para two", 15.0)];
        assert_eq!(join_lines(&lines, JoinStyle::Latin), "para one\npara two");
    }

    #[test]
    fn korean_sentence_ending_breaks_line() {
        let lines = tight(&["즉시 의사의 진찰을 받으시오", "오염된 의복은 벗으시오"]);
        assert_eq!(
            join_lines(&lines, JoinStyle::Korean),
            "즉시 의사의 진찰을 받으시오\n오염된 의복은 벗으시오"
        );
    }

    #[test]
    fn korean_particle_break_inserts_space() {
        // Ends on the particle 를, so the wrap was a word boundary.
        let lines = tight(&["오염된 의복을", "제거하고"]);
        assert_eq!(join_lines(&lines, JoinStyle::Korean), "오염된 의복을 제거하고");
    }

    #[test]
    fn korean_mid_word_wrap_rejoins_without_space() {
        // Ends mid-word (받 is not a boundary particle).
        let lines = tight(&["의사의 진찰받", "기"]);
        assert_eq!(join_lines(&lines, JoinStyle::Korean), "의사의 진찰받기");
    }

    #[test]
    fn korean_enumeration_marker_breaks_line() {
        let lines = tight(&["첫번째 조치사항과", "(1) 환기"]);
        assert_eq!(join_lines(&lines, JoinStyle::Korean), "첫번째 조치사항과\n(1) 환기");
    }

    // --- exposure items ---

    #[test]
    fn exposure_items_drop_not_applicable() {
        let text = "TWA : [50 ppm] - STEL : 해당없음 - 발암성 물질";
        assert_eq!(parse_exposure_items(text), "TWA : 50 ppm\n발암성 물질");
    }

    #[test]
    fn exposure_items_collapse_to_no_data() {
        assert_eq!(parse_exposure_items(""), "자료없음");
        assert_eq!(parse_exposure_items("- 해당없음"), "자료없음");
    }
}
