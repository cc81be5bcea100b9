//! GHS hazard/precaution code extraction and composition-table scanning.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::cluster::ClusteredLine;
use crate::record::CompositionEntry;

/// H/P statement codes, tolerating a stray space after the letter and
/// around the `+` joining combined statements.
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[HP]\s?\d{3}(?:\s*\+\s*[HP]\s?\d{3})*").expect("valid pattern")
});

/// CAS registry numbers with lenient internal spacing.
static CAS_STRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,7}\s*-\s*\d{2}\s*-\s*\d)\b").expect("valid pattern"));

/// Looser shape that also covers EC numbers (three-digit middle group).
/// Used to blank EC numbers out of a line so they cannot be mistaken for
/// concentration figures, and as a fallback CAS locator.
static CAS_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{2,7}\s*-\s*\d{2,3}\s*-\s*\d\b").expect("valid pattern"));

static CAS_NORMALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d").expect("valid pattern"));

static CONC_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?)\s*(?:-|~)\s*(\d+(?:\.\d+)?)\b").expect("valid pattern")
});

/// Tilde-only variant for table layouts where hyphens also appear in
/// dates and identifiers.
static CONC_TILDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*~\s*(\d+(?:\.\d+)?)").expect("valid pattern")
});

static CONC_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\b").expect("valid pattern"));

static SUBSECTION_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+").expect("valid pattern"));

// ---------------------------------------------------------------------------
// Code extraction
// ---------------------------------------------------------------------------

/// Extract normalized H/P codes from free text, first-seen order, deduped.
pub fn extract_codes(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in CODE_RE.find_iter(text) {
        let code = m.as_str().replace(' ', "").to_uppercase();
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

/// H/P codes routed into the record's five category lists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeBuckets {
    pub h_codes: Vec<String>,
    pub p_prev: Vec<String>,
    pub p_resp: Vec<String>,
    pub p_stor: Vec<String>,
    pub p_disp: Vec<String>,
}

/// Route every code found in `text` into its category list: H codes in one
/// bucket, P codes by the hundreds digit of the first code of a combined
/// statement (P2xx prevention, P3xx response, P4xx storage, P5xx disposal).
///
/// `rescue_p321` re-adds a literal "P321" occurrence the code pattern missed;
/// Korean sheets sometimes typeset it in a way that defeats the regex.
pub fn bucket_codes(text: &str, rescue_p321: bool) -> CodeBuckets {
    let mut codes = extract_codes(text);
    if rescue_p321 && text.contains("P321") && !codes.iter().any(|c| c == "P321") {
        codes.push("P321".to_string());
    }

    let mut buckets = CodeBuckets::default();
    for code in codes {
        if code.starts_with('H') {
            buckets.h_codes.push(code);
        } else if code.starts_with('P') {
            let head = code.split('+').next().unwrap_or("");
            match head.get(..2) {
                Some("P2") => buckets.p_prev.push(code),
                Some("P3") => buckets.p_resp.push(code),
                Some("P4") => buckets.p_stor.push(code),
                Some("P5") => buckets.p_disp.push(code),
                _ => {}
            }
        }
    }
    buckets
}

// ---------------------------------------------------------------------------
// Composition table
// ---------------------------------------------------------------------------

const CONC_MAX: Decimal = Decimal::ONE_HUNDRED;

fn within_bound(s: &str) -> bool {
    s.parse::<Decimal>().map(|v| v <= CONC_MAX).unwrap_or(false)
}

/// Lower bounds of exactly 1 are rewritten to 0; the source sheets use
/// "1 ~ hi" to mean "less than hi".
fn normalize_lower(s: &str) -> &str {
    if s == "1" {
        "0"
    } else {
        s
    }
}

fn range_within_bounds(lo: &str, hi: &str) -> bool {
    match (lo.parse::<Decimal>(), hi.parse::<Decimal>()) {
        (Ok(lo), Ok(hi)) => lo <= hi && hi <= CONC_MAX,
        _ => false,
    }
}

/// Concentration from a line fragment: a `lo ~ hi` range wins over a single
/// figure; out-of-bound or inverted figures leave the field empty.
fn find_concentration(fragment: &str) -> String {
    if let Some(caps) = CONC_RANGE_RE.captures(fragment) {
        let (lo, hi) = (&caps[1], &caps[2]);
        if range_within_bounds(lo, hi) {
            return format!("{} ~ {}", normalize_lower(lo), hi);
        }
        return String::new();
    }
    if let Some(caps) = CONC_SINGLE_RE.captures(fragment) {
        if within_bound(&caps[1]) {
            return caps[1].to_string();
        }
    }
    String::new()
}

/// Whether this clustered line opens the composition section.
pub fn is_composition_heading(text: &str) -> bool {
    text.contains("3.")
        && (text.contains("성분")
            || text.contains("Composition")
            || text.contains("COMPOSITION"))
}

/// Whether this clustered line opens the first-aid section that follows it.
pub fn is_first_aid_heading(text: &str) -> bool {
    text.contains("4.")
        && (text.contains("응급") || text.contains("First") || text.contains("FIRST"))
}

/// How a composition table line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStyle {
    /// HP sheets: a strict CAS anchors the row; the concentration (range or
    /// single figure) is searched in the text after it.
    CasAnchored,
    /// CFF Korean sheets: EC numbers share the table column with CAS
    /// numbers, so the loose shape is blanked out before a tilde-only range
    /// search; a bare figure is never taken as a concentration.
    EcAware,
}

/// One composition row from a single table line: first CAS number plus the
/// nearest concentration figure on the same line. The association never
/// crosses lines.
pub fn composition_from_line(text: &str, style: CompositionStyle) -> Option<CompositionEntry> {
    if SUBSECTION_NUMBER_RE.is_match(text) {
        return None;
    }

    let mut cas = String::new();
    let mut concentration = String::new();

    match style {
        CompositionStyle::CasAnchored => {
            if let Some(m) = CAS_STRICT_RE.find(text) {
                cas = m.as_str().replace(' ', "");
                concentration = find_concentration(&text[m.end()..]);
            }
        }
        CompositionStyle::EcAware => {
            if let Some(m) = CAS_STRICT_RE.find(text) {
                cas = m.as_str().replace(' ', "");
            } else if let Some(m) = CAS_LOOSE_RE.find(text) {
                let candidate = m.as_str().replace(' ', "");
                if CAS_NORMALIZED_RE.is_match(&candidate) {
                    cas = candidate;
                }
            }
            let blanked = CAS_LOOSE_RE.replace_all(text, " ");
            if let Some(caps) = CONC_TILDE_RE.captures(&blanked) {
                let (lo, hi) = (&caps[1], &caps[2]);
                if range_within_bounds(lo, hi) {
                    concentration = format!("{} ~ {}", normalize_lower(lo), hi);
                }
            }
        }
    }

    if cas.is_empty() && concentration.is_empty() {
        None
    } else {
        Some(CompositionEntry { cas, concentration })
    }
}

/// Line-scan composition extraction: rows between the section 3 heading and
/// the section 4 heading, one entry per line carrying a CAS number or a
/// concentration.
pub fn scan_composition(lines: &[ClusteredLine], style: CompositionStyle) -> Vec<CompositionEntry> {
    let mut entries = Vec::new();
    let mut in_table = false;
    for line in lines {
        if is_composition_heading(&line.text) {
            in_table = true;
            continue;
        }
        if is_first_aid_heading(&line.text) {
            break;
        }
        if in_table {
            if let Some(entry) = composition_from_line(&line.text, style) {
                entries.push(entry);
            }
        }
    }
    entries
}

/// Section-text composition extraction (CFF English sheets): all CAS numbers
/// and all in-bound ranges found in the section text, zipped by position and
/// padded with empty fields where the counts differ.
pub fn composition_from_text(text: &str) -> Vec<CompositionEntry> {
    let cas_list: Vec<String> = CAS_STRICT_RE
        .find_iter(text)
        .map(|m| m.as_str().replace(' ', ""))
        .collect();

    let no_cas = CAS_STRICT_RE.replace_all(text, " ");
    let conc_list: Vec<String> = CONC_RANGE_RE
        .captures_iter(&no_cas)
        .filter(|caps| range_within_bounds(&caps[1], &caps[2]))
        .map(|caps| format!("{} ~ {}", normalize_lower(&caps[1]), &caps[2]))
        .collect();

    let len = cas_list.len().max(conc_list.len());
    (0..len)
        .map(|i| CompositionEntry {
            cas: cas_list.get(i).cloned().unwrap_or_default(),
            concentration: conc_list.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> ClusteredLine {
        ClusteredLine {
            text: text.to_string(),
            global_y0: 0.0,
            global_y1: 10.0,
        }
    }

    // --- codes ---

    #[test]
    fn codes_are_normalized_and_deduped_in_order() {
        assert_eq!(extract_codes("H315 H315 H319"), vec!["H315", "H319"]);
        assert_eq!(extract_codes("h315 is not a code, H 315 is"), vec!["H315"]);
        assert_eq!(
            extract_codes("P303 + P361+P353 then P303+P361+P353 again"),
            vec!["P303+P361+P353"]
        );
    }

    #[test]
    fn combined_statement_is_one_code() {
        let buckets = bucket_codes("H315+H320 P264 P264", false);
        assert_eq!(buckets.h_codes, vec!["H315+H320"]);
        assert_eq!(buckets.p_prev, vec!["P264"]);
    }

    #[test]
    fn p_codes_route_by_hundreds_digit() {
        let buckets = bucket_codes("P210 P301+P312 P403 P501", false);
        assert_eq!(buckets.p_prev, vec!["P210"]);
        assert_eq!(buckets.p_resp, vec!["P301+P312"]);
        assert_eq!(buckets.p_stor, vec!["P403"]);
        assert_eq!(buckets.p_disp, vec!["P501"]);
    }

    #[test]
    fn p321_rescue_only_when_enabled() {
        // A letter glued to the code defeats the word-ish pattern only in
        // contrived text; the rescue keys off the literal substring.
        let with = bucket_codes("P321", true);
        assert_eq!(with.p_resp, vec!["P321"]);
        let buckets = bucket_codes("no codes here", true);
        assert!(buckets.p_resp.is_empty());
    }

    // --- composition ---

    #[test]
    fn cas_with_range_on_one_line() {
        let entry =
            composition_from_line("1310-58-3  5 ~ 10", CompositionStyle::CasAnchored).unwrap();
        assert_eq!(entry.cas, "1310-58-3");
        assert_eq!(entry.concentration, "5 ~ 10");
    }

    #[test]
    fn out_of_bound_concentration_is_dropped() {
        let entry = composition_from_line("999-99-9 150", CompositionStyle::CasAnchored).unwrap();
        assert_eq!(entry.cas, "999-99-9");
        assert_eq!(entry.concentration, "");
    }

    #[test]
    fn lower_bound_of_one_becomes_zero() {
        let entry = composition_from_line("64-17-5 1 ~ 5", CompositionStyle::CasAnchored).unwrap();
        assert_eq!(entry.concentration, "0 ~ 5");
    }

    #[test]
    fn inverted_range_is_dropped() {
        let entry =
            composition_from_line("64-17-5 50 ~ 10", CompositionStyle::CasAnchored).unwrap();
        assert_eq!(entry.concentration, "");
    }

    #[test]
    fn spaced_cas_is_normalized() {
        let entry = composition_from_line(
            "Potassium hydroxide 1310 - 58 - 3 5",
            CompositionStyle::CasAnchored,
        )
        .unwrap();
        assert_eq!(entry.cas, "1310-58-3");
        assert_eq!(entry.concentration, "5");
    }

    #[test]
    fn leading_figure_is_not_a_concentration() {
        // The concentration search starts after the CAS anchor.
        let entry =
            composition_from_line("2 Ethanol 64-17-5", CompositionStyle::CasAnchored).unwrap();
        assert_eq!(entry.concentration, "");
    }

    #[test]
    fn ec_number_is_not_mistaken_for_cas_or_concentration() {
        // 215-181-3 is an EC number: three-digit middle group.
        let entry =
            composition_from_line("KOH 215-181-3 1310-58-3 5 ~ 10", CompositionStyle::EcAware)
                .unwrap();
        assert_eq!(entry.cas, "1310-58-3");
        assert_eq!(entry.concentration, "5 ~ 10");

        assert!(composition_from_line("KOH 215-181-3", CompositionStyle::EcAware).is_none());
    }

    #[test]
    fn ec_aware_ignores_bare_single_figures() {
        assert!(composition_from_line("Perfume base 15", CompositionStyle::EcAware).is_none());
    }

    #[test]
    fn subsection_numbers_are_skipped() {
        assert!(
            composition_from_line("3.1 Substances 10 ~ 20", CompositionStyle::CasAnchored)
                .is_none()
        );
    }

    #[test]
    fn scan_stops_at_first_aid_heading() {
        let lines = vec![
            line("3. Composition/information on ingredients"),
            line("Ethanol 64-17-5 10 ~ 20"),
            line("4. First-aid measures"),
            line("123-45-6 30 ~ 40"),
        ];
        let entries = scan_composition(&lines, CompositionStyle::CasAnchored);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cas, "64-17-5");
    }

    #[test]
    fn section_text_zips_cas_and_ranges_by_position() {
        let text = "Ethanol 64-17-5 10 ~ 20\nMethanol 67-56-1\nWater 5 ~ 10";
        let entries = composition_from_text(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cas, "64-17-5");
        assert_eq!(entries[0].concentration, "10 ~ 20");
        assert_eq!(entries[1].cas, "67-56-1");
        assert_eq!(entries[1].concentration, "5 ~ 10");
    }
}
