//! Per-mode record assembly.
//!
//! Each mode runs a fixed script of section extractions over the clustered
//! line list. The keyword pairs bounding every field are domain data lifted
//! from the four sheet templates; changing one breaks that template's
//! extraction even though the code still "works". Every step is independent:
//! a section that fails to extract leaves its field empty and the script
//! carries on.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::cluster::ClusteredLine;
use crate::codes::{self, CompositionStyle};
use crate::mode::Mode;
use crate::record::{MsdsRecord, TransportInfo};
use crate::section::{extract_section, parse_exposure_items};

static ITEM_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*-\s*").expect("valid pattern"));
static SIGNAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[sS]\b)?[\s\-○•]+").expect("valid pattern"));
static FIRST_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("valid pattern"));
static NON_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("valid pattern"));
static PAREN_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid pattern"));
static SHIPPING_NAME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:proper\s*)?shipping\s*name").expect("valid pattern"));

/// Build the structured record for one document in the given mode.
pub fn build_record(lines: &[ClusteredLine], mode: Mode) -> MsdsRecord {
    match mode {
        Mode::HpEn => build_hp_en(lines),
        Mode::CffEn => build_cff_en(lines),
        Mode::HpKo | Mode::CffKo => build_korean(lines, mode),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn strip_item_dashes(text: &str) -> String {
    ITEM_DASH_RE.replace_all(text, "").trim().to_string()
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn first_digit(text: &str) -> String {
    FIRST_DIGIT_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn digits_only(text: &str) -> String {
    NON_DIGIT_RE.replace_all(text, "").to_string()
}

fn strip_prefix_pattern(text: &str, pattern: &str) -> String {
    Regex::new(pattern)
        .expect("valid prefix pattern")
        .replace(text, "")
        .trim()
        .to_string()
}

/// Slice the document at numbered section headings, matched by plain
/// (uppercased) substring containment rather than the space-insensitive
/// keyword rule; heading rows come out of clustering intact.
fn slice_sections<'a>(
    lines: &'a [ClusteredLine],
    starts: &[&str],
    ends: &[&str],
) -> &'a [ClusteredLine] {
    let start = lines
        .iter()
        .position(|l| starts.iter().any(|kw| l.text.to_uppercase().contains(kw)));
    let Some(start) = start else {
        return &[];
    };
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| ends.iter().any(|kw| l.text.to_uppercase().contains(kw)))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());
    &lines[start..end]
}

// ---------------------------------------------------------------------------
// HP English
// ---------------------------------------------------------------------------

fn build_hp_en(lines: &[ClusteredLine]) -> MsdsRecord {
    let mode = Mode::HpEn;
    let mut record = MsdsRecord::default();

    let hazard_raw = extract_section(lines, "A. GHS Classification", &["B. GHS label elements"], mode);
    record.hazard_cls = non_empty_lines(&strip_item_dashes(&hazard_raw));

    let signal_raw = extract_section(lines, "Signal word", &["Hazard statement"], mode);
    record.signal_word = SIGNAL_PREFIX_RE
        .replace(signal_raw.trim(), "")
        .trim()
        .to_string();

    let h_text = extract_section(lines, "Hazard statement", &["Precautionary statement"], mode);
    record.h_codes = codes::extract_codes(&h_text);
    record.p_prev =
        codes::extract_codes(&extract_section(lines, "1) Prevention", &["2) Response"], mode));
    record.p_resp =
        codes::extract_codes(&extract_section(lines, "2) Response", &["3) Storage"], mode));
    record.p_stor =
        codes::extract_codes(&extract_section(lines, "3) Storage", &["4) Disposal"], mode));
    record.p_disp =
        codes::extract_codes(&extract_section(lines, "4) Disposal", &["C. Other hazards"], mode));

    record.composition_data = codes::scan_composition(lines, CompositionStyle::CasAnchored);

    // Section 5 keywords recur in the firefighting table of contents, so
    // its extractions are restricted to the lines from the heading on.
    let sec5_start = lines
        .iter()
        .position(|l| l.text.to_uppercase().contains("5. FIREFIGHTING"));
    let sec5_lines = sec5_start.map(|i| &lines[i..]).unwrap_or(lines);

    let sec = |start: &str, ends: &[&str]| -> String {
        strip_item_dashes(&extract_section(lines, start, ends, mode))
    };
    let mut data = BTreeMap::new();
    data.insert("B126".into(), sec("Eye contact", &["Skin contact"]));
    data.insert("B127".into(), sec("Skin contact", &["Inhalation contact"]));
    data.insert("B128".into(), sec("Inhalation contact", &["Ingestion contact"]));
    data.insert("B129".into(), sec("Ingestion contact", &["Delayed and"]));

    let b132 = strip_item_dashes(&extract_section(sec5_lines, "Suitable", &["Specific hazards"], mode));
    data.insert(
        "B132".into(),
        strip_prefix_pattern(&b132, r"(?i)^\s*\(unsuitable\)\s*extinguishing\s*media\s*"),
    );
    let b134 = strip_item_dashes(&extract_section(
        sec5_lines,
        "Specific hazards arising",
        &["Special protective"],
        mode,
    ));
    data.insert("B134".into(), strip_prefix_pattern(&b134, r"(?i)^\s*from\s*the\s*chemical\s*"));
    let b136 = strip_item_dashes(&extract_section(
        sec5_lines,
        "Special protective actions",
        &["6. ACCIDENTAL"],
        mode,
    ));
    data.insert("B136".into(), strip_prefix_pattern(&b136, r"(?i)^\s*for\s*firefighters\s*"));

    data.insert("B140".into(), sec("Personal precautions", &["Environmental precautions"]));
    data.insert("B142".into(), sec("Environmental precautions", &["Methods and materials"]));
    data.insert("B144".into(), sec("Methods and materials for containment", &["7. HANDLING"]));

    let b148 = sec("Precautions for safe", &["Conditions for safe"]);
    data.insert("B148".into(), strip_prefix_pattern(&b148, r"(?i)^\s*handling\s*"));
    let b150 = sec("Conditions for safe storage", &["8. EXPOSURE"]);
    data.insert(
        "B150".into(),
        strip_prefix_pattern(&b150, r"(?i)^[\s,]*including\s*any\s*incompatibilities\s*"),
    );
    record.sec4_to_7 = data;

    record.sec8 = hp_en_exposure(lines);
    record.sec9 = hp_en_physical(lines);
    record.sec14 = hp_en_transport(lines);
    record.sec15.insert("DANGER".into(), String::new());
    record
}

fn hp_en_exposure(lines: &[ClusteredLine]) -> BTreeMap<String, String> {
    let raw = extract_section(lines, "ACGIH", &["OSHA"], Mode::HpEn);
    let raw = strip_prefix_pattern(&raw, r"(?i)^.*TLV\s*");
    let clean = Regex::new(r"[○•\-*]+")
        .expect("valid pattern")
        .replace_all(&raw, "")
        .trim()
        .to_string();

    let mut sec = BTreeMap::new();
    if clean.is_empty() || clean.contains("Not applicable") || clean.contains("Not available") {
        sec.insert("B156".into(), "no data available".to_string());
        sec.insert("B157".into(), String::new());
        sec.insert("B158".into(), String::new());
    } else {
        let rows = non_empty_lines(&clean);
        sec.insert(
            "B156".into(),
            rows.first().cloned().unwrap_or_else(|| "no data available".into()),
        );
        sec.insert("B157".into(), rows.get(1).cloned().unwrap_or_default());
        sec.insert(
            "B158".into(),
            if rows.len() > 2 { rows[2..].join("\n") } else { String::new() },
        );
    }
    sec
}

fn hp_en_physical(lines: &[ClusteredLine]) -> BTreeMap<String, String> {
    let sec9_lines = slice_sections(lines, &["9. PHYSICAL", "9. 물리화학"], &["10. STABILITY", "10. 안정성"]);

    // Label rows keep their value on the same clustered line.
    let find_value = |keyword: &str| -> String {
        for line in sec9_lines {
            if line.text.to_lowercase().contains(&keyword.to_lowercase()) {
                if let Some((_, tail)) = line.text.split_once(keyword) {
                    let value = strip_prefix_pattern(tail, r"^[:\s\-.]+");
                    if !value.is_empty() {
                        return value;
                    }
                }
            }
        }
        String::new()
    };

    let mut sec = BTreeMap::new();
    let color = find_value("Color");
    sec.insert("B170".into(), if color.is_empty() { String::new() } else { capitalize(&color) });
    sec.insert("B176".into(), find_value("Flash point"));

    let gravity = find_value("Specific gravity");
    let figure = Regex::new(r"[\d.]+")
        .expect("valid pattern")
        .find(&gravity)
        .map(|m| m.as_str().to_string());
    sec.insert(
        "B183".into(),
        figure.map(|g| format!("{g} ± 0.010")).unwrap_or_default(),
    );
    sec.insert("B189".into(), "± 0.005".to_string());
    sec
}

fn hp_en_transport(lines: &[ClusteredLine]) -> TransportInfo {
    let mode = Mode::HpEn;
    let un_raw = extract_section(lines, "UN No.", &["Proper shipping name"], mode);

    let name_raw = extract_section(
        lines,
        "Proper shipping name",
        &["C. Hazard Class", "Hazard Class"],
        mode,
    );
    let name = SHIPPING_NAME_LABEL_RE.replace_all(&name_raw, "");
    let name = PAREN_GROUP_RE.replace_all(&name, "").replace('-', "");

    let class_raw = extract_section(lines, "C. Hazard Class", &["D. IMDG", "Packing group"], mode)
        .replace('-', "");
    let pg_raw = extract_section(lines, "Packing group", &["E. Marine pollutant"], mode);
    let env_raw = extract_section(lines, "E. Marine pollutant", &["F. Special precautions"], mode);

    TransportInfo {
        un_number: digits_only(&un_raw),
        shipping_name: name.trim().to_string(),
        hazard_class: first_digit(&class_raw),
        packing_group: pg_raw.replace('-', "").trim().to_string(),
        marine_pollutant: env_raw.replace('-', "").trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// CFF English
// ---------------------------------------------------------------------------

fn build_cff_en(lines: &[ClusteredLine]) -> MsdsRecord {
    let mode = Mode::CffEn;
    let mut record = MsdsRecord::default();

    record.hazard_cls = cff_en_hazard_classification(lines);

    let full_text = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n");
    if let Some(caps) = Regex::new(r"(?i)Signal word\s*[:\-\s]*([A-Za-z]+)")
        .expect("valid pattern")
        .captures(&full_text)
    {
        record.signal_word = capitalize(&caps[1]);
    }

    let code_text = extract_section(lines, "2. Hazards", &["3. Composition"], mode);
    let buckets = codes::bucket_codes(&code_text, false);
    record.h_codes = buckets.h_codes;
    record.p_prev = buckets.p_prev;
    record.p_resp = buckets.p_resp;
    record.p_stor = buckets.p_stor;
    record.p_disp = buckets.p_disp;

    let comp_text = extract_section(lines, "3. Composition", &["4. FIRST-AID"], mode);
    record.composition_data = codes::composition_from_text(&comp_text);

    let sec = |start: &str, ends: &[&str]| extract_section(lines, start, ends, mode);
    let mut data = BTreeMap::new();
    data.insert("B125".into(), sec("4.1 General advice", &["4.2 In case of eye contact"]));
    data.insert(
        "B126".into(),
        sec("4.2 In case of eye contact", &["4.3 In case of skin contact"]),
    );
    data.insert("B127".into(), sec("4.3 In case of skin contact", &["4.4 If inhaled"]));
    data.insert("B128".into(), sec("4.4 If inhaled", &["4.5 If swallowed"]));
    data.insert(
        "B129".into(),
        sec("4.5 If swallowed", &["4.6 Special note for doctors"]).replace(
            "Medical personnel, and to ensure that take protection measures is recognized for its substance",
            "",
        ),
    );
    data.insert("B132".into(), sec("5.1 Extinguishing media", &["5.2 Special hazards"]));
    data.insert(
        "B134".into(),
        sec("5.2 Special hazards", &["5.3 Advice for firefighters"])
            .replace("substance or mixture", ""),
    );
    data.insert("B136".into(), sec("5.3 Advice for firefighters", &["6. Accidental"]));
    data.insert(
        "B140".into(),
        sec("6.1 Personal precautions", &["6.2 Environmental"])
            .replace("equipment and emergency procedures", ""),
    );
    data.insert("B142".into(), sec("6.2 Environmental", &["6.3 Methods"]));
    data.insert(
        "B144".into(),
        sec("6.3 Methods", &["7. Handling"]).replace("and cleaning up", ""),
    );
    data.insert("B148".into(), sec("7.1 Precautions", &["7.2 Conditions"]));
    data.insert(
        "B150".into(),
        sec("7.2 Conditions", &["8. Exposure"]).replace("any incompatibilities", ""),
    );
    record.sec4_to_7 = data;

    record.sec8.insert(
        "B154".into(),
        extract_section(lines, "Internal regulations", &["ACGIH regulations"], mode),
    );
    record.sec8.insert(
        "B156".into(),
        extract_section(lines, "ACGIH regulations", &["Biological exposure"], mode),
    );

    let sec9_lines = slice_sections(lines, &["9. PHYSICAL", "9. 물리화학"], &["10. STABILITY", "10. 안정성"]);
    record.sec9.insert("B170".into(), extract_section(sec9_lines, "Color", &["Odor"], mode));
    record.sec9.insert(
        "B176".into(),
        extract_section(sec9_lines, "Flash point", &["Evaporation rate"], mode),
    );
    record.sec9.insert(
        "B183".into(),
        extract_section(sec9_lines, "Specific gravity", &["Partition coefficient"], mode)
            .replace("(20/20℃)", "")
            .replace("(Water=1)", "")
            .trim()
            .to_string(),
    );
    record.sec9.insert(
        "B189".into(),
        extract_section(sec9_lines, "Refractive index", &["10. Stability"], mode)
            .replace("(20℃)", "")
            .trim()
            .to_string(),
    );

    record.sec14 = cff_en_transport(lines);
    record
}

fn cff_en_hazard_classification(lines: &[ClusteredLine]) -> Vec<String> {
    let text = extract_section(lines, "2. Hazards identification", &["2.2 Labelling"], Mode::CffEn);
    // Category markers end a classification entry even when the source
    // runs several entries together on one row.
    let text = Regex::new(r"(Category\s*\d+[A-Za-z]?)")
        .expect("valid pattern")
        .replace_all(&text, "$1\n");

    let mut entries = Vec::new();
    for line in text.split('\n') {
        let mut line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line.contains("2.1 Classification") {
            line = line
                .replace("2.1 Classification of the substance or", "")
                .replace("mixture", "")
                .trim()
                .to_string();
            if line.is_empty() {
                continue;
            }
        }
        let lower = line.to_lowercase();
        if lower == "mixture" || lower == "mixture." {
            continue;
        }
        entries.push(line);
    }
    entries
}

fn cff_en_transport(lines: &[ClusteredLine]) -> TransportInfo {
    let mode = Mode::CffEn;
    let un_raw = extract_section(lines, "14.1 UN number", &["14.2 Proper"], mode);

    let name_raw = extract_section(lines, "14.2 Proper", &["14.3 Transport"], mode);
    let name = SHIPPING_NAME_LABEL_RE.replace_all(&name_raw, "");
    let name = PAREN_GROUP_RE.replace_all(&name, "");

    let class_raw =
        extract_section(lines, "14.3 Transport hazard class", &["14.4 Packing group"], mode);

    TransportInfo {
        un_number: digits_only(&un_raw),
        shipping_name: name.trim().to_string(),
        hazard_class: first_digit(&class_raw),
        packing_group: extract_section(lines, "14.4 Packing group", &["14.5 Environmental hazard"], mode),
        marine_pollutant: extract_section(lines, "14.5 Environmental hazard", &["IATA"], mode),
    }
}

// ---------------------------------------------------------------------------
// Korean modes
// ---------------------------------------------------------------------------

fn build_korean(lines: &[ClusteredLine], mode: Mode) -> MsdsRecord {
    let mut lines = lines.to_vec();
    if mode == Mode::CffKo {
        merge_split_shipping_rows(&mut lines);
    }
    let mut record = MsdsRecord::default();

    // Everything above the composition heading; the hazard codes recur in
    // later sections and must only be counted from section 2.
    let limit_y = lines
        .iter()
        .find(|l| l.text.contains("3. 구성성분") || l.text.contains("3. 성분"))
        .map(|l| l.global_y0)
        .unwrap_or(f32::INFINITY);
    let head_text = lines
        .iter()
        .filter(|l| l.global_y0 < limit_y)
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    record.signal_word = korean_signal_word(&head_text, mode);
    record.hazard_cls = korean_hazard_classification(&head_text, mode);

    let buckets = codes::bucket_codes(&head_text, true);
    record.h_codes = buckets.h_codes;
    record.p_prev = buckets.p_prev;
    record.p_resp = buckets.p_resp;
    record.p_stor = buckets.p_stor;
    record.p_disp = buckets.p_disp;

    let style = match mode {
        Mode::HpKo => CompositionStyle::CasAnchored,
        _ => CompositionStyle::EcAware,
    };
    record.composition_data = codes::scan_composition(&lines, style);

    record.sec4_to_7 = korean_sec4_to_7(&lines, mode);
    record.sec8 = korean_exposure(&lines, mode);
    record.sec9 = korean_physical(&lines, mode);
    record.sec14 = korean_transport(&lines, mode);
    record.sec15 = korean_regulatory(&lines, mode);
    record
}

/// CFF Korean sheets wrap the shipping-name row so that the value lands on
/// the visual row above its label; fold it back onto the label row.
fn merge_split_shipping_rows(lines: &mut [ClusteredLine]) {
    for i in 1..lines.len() {
        if !lines[i].text.contains("적정선적명") {
            continue;
        }
        let close = (lines[i - 1].global_y0 - lines[i].global_y0).abs() < 20.0;
        let prev = &lines[i - 1].text;
        if close && !prev.contains("적정선적명") && !prev.contains("유엔번호") {
            let merged = format!("{} {}", lines[i].text, lines[i - 1].text);
            lines[i].text = merged;
            lines[i - 1].text.clear();
        }
    }
}

fn korean_signal_word(head_text: &str, mode: Mode) -> String {
    if mode == Mode::HpKo {
        if let Some(start) = head_text.find("신호어") {
            if let Some(rel_end) = head_text[start..].find("유해") {
                let area = &head_text[start..start + rel_end];
                if let Some(caps) = Regex::new(r"[-•]\s*(위험|경고)")
                    .expect("valid pattern")
                    .captures(area)
                {
                    return caps[1].to_string();
                }
            }
        }
    }
    // Shared fallback: a labelled row, or a bare signal word on its own row.
    let mut signal = String::new();
    for line in head_text.split('\n') {
        if line.contains("신호어") {
            let value = line.replace("신호어", "").replace(':', "");
            let value = value.trim();
            if value == "위험" || value == "경고" {
                signal = value.to_string();
            }
        } else if signal.is_empty() {
            let trimmed = line.trim();
            if trimmed == "위험" || trimmed == "경고" {
                signal = trimmed.to_string();
            }
        }
    }
    signal
}

fn korean_hazard_classification(head_text: &str, mode: Mode) -> Vec<String> {
    let mut entries = Vec::new();
    let mut in_section = false;

    if mode == Mode::HpKo {
        for line in head_text.split('\n') {
            if line.contains("가. 유해성") {
                in_section = true;
                continue;
            }
            if line.contains("나. 예방조치") {
                in_section = false;
                continue;
            }
            if in_section && !line.trim().is_empty() {
                if line.contains("공급자") || line.contains("회사명") {
                    continue;
                }
                let clean = line.replace('-', "").trim().to_string();
                if !clean.is_empty() {
                    entries.push(clean);
                }
            }
        }
    } else {
        let header_re = Regex::new(r"[가-하][.\s]*유해성[\s.·ㆍ\-]*위험성[\s.·ㆍ\-]*분류[\s:]*")
            .expect("valid pattern");
        for line in head_text.split('\n') {
            let nospace = line.replace(' ', "");
            if nospace.contains("2.유해성") && nospace.contains("위험성") {
                in_section = true;
                continue;
            }
            if nospace.contains("나.예방조치") {
                in_section = false;
                continue;
            }
            if in_section && !line.trim().is_empty() {
                let mut line = line.to_string();
                if nospace.contains("가.유해성") && nospace.contains("분류") {
                    let stripped = header_re.replace_all(&line, "").trim().to_string();
                    if stripped.is_empty() {
                        continue;
                    }
                    line = stripped;
                }
                if !line.contains("공급자") && !line.contains("회사명") {
                    entries.push(line.trim().to_string());
                }
            }
        }
    }
    entries
}

fn korean_sec4_to_7(lines: &[ClusteredLine], mode: Mode) -> BTreeMap<String, String> {
    let sec = |start: &str, ends: &[&str]| extract_section(lines, start, ends, mode);
    let mut data = BTreeMap::new();

    // First-aid item letters shift between the two templates.
    if mode == Mode::HpKo {
        data.insert("B125".into(), sec("가. 눈에", &["나. 피부"]));
        data.insert("B126".into(), sec("나. 피부", &["다. 흡입"]));
        data.insert("B127".into(), sec("다. 흡입", &["라. 먹었을"]));
        data.insert("B128".into(), sec("라. 먹었을", &["마. 기타"]));
        data.insert("B129".into(), sec("마. 기타", &["5.", "폭발"]));
    } else {
        data.insert("B125".into(), sec("나. 눈", &["다. 피부"]));
        data.insert("B126".into(), sec("다. 피부", &["라. 흡입"]));
        data.insert("B127".into(), sec("라. 흡입", &["마. 먹었을"]));
        data.insert("B128".into(), sec("마. 먹었을", &["바. 기타"]));
        data.insert("B129".into(), sec("바. 기타", &["5.", "폭발"]));
    }

    data.insert("B132".into(), sec("가. 적절한", &["나. 화학물질"]));
    let b133 = sec("나. 화학물질", &["다. 화재진압"]);
    data.insert("B133".into(), strip_prefix_pattern(&b133, r"^(특정\s*유해성)\s*"));
    data.insert("B134".into(), sec("다. 화재진압", &["6.", "누출"]));

    data.insert("B138".into(), sec("가. 인체를", &["나. 환경을"]));
    data.insert("B139".into(), sec("나. 환경을", &["다. 정화"]));
    data.insert("B140".into(), sec("다. 정화", &["7.", "취급"]));
    data.insert("B143".into(), sec("가. 안전취급", &["나. 안전한"]));
    data.insert("B144".into(), sec("나. 안전한", &["8.", "노출"]));
    data
}

fn korean_exposure(lines: &[ClusteredLine], mode: Mode) -> BTreeMap<String, String> {
    let sec8_lines = slice_sections(lines, &["8. 노출방지"], &["9. 물리화학"]);

    let (b148, b150) = if mode == Mode::HpKo {
        let b148 = extract_section(sec8_lines, "국내노출기준", &["ACGIH노출기준"], mode);
        let b150 = extract_section(sec8_lines, "ACGIH노출기준", &["생물학적"], mode);
        (parse_exposure_items(&b148), parse_exposure_items(&b150))
    } else {
        (
            extract_section(sec8_lines, "국내규정", &["ACGIH"], mode),
            extract_section(sec8_lines, "ACGIH", &["생물학적"], mode),
        )
    };

    let mut sec = BTreeMap::new();
    sec.insert("B148".into(), b148);
    sec.insert("B150".into(), b150);
    sec
}

fn korean_physical(lines: &[ClusteredLine], mode: Mode) -> BTreeMap<String, String> {
    let sec9_lines = slice_sections(lines, &["9. PHYSICAL", "9. 물리화학"], &["10. STABILITY", "10. 안정성"]);
    let color_kw = if mode == Mode::HpKo { "- 색" } else { "색상" };

    let mut sec = BTreeMap::new();
    sec.insert(
        "B163".into(),
        extract_section(sec9_lines, color_kw, &["나. 냄새"], mode),
    );
    sec.insert(
        "B169".into(),
        extract_section(sec9_lines, "인화점", &["아. 증발속도"], mode),
    );
    sec.insert(
        "B176".into(),
        extract_section(sec9_lines, "비중", &["거. n-옥탄올"], mode),
    );
    sec.insert(
        "B182".into(),
        extract_section(sec9_lines, "굴절률", &["10. 안정성", "10. 화학적"], mode),
    );
    sec
}

fn korean_transport(lines: &[ClusteredLine], mode: Mode) -> TransportInfo {
    let sec14_lines = slice_sections(lines, &["14. 운송에"], &["15. 법적규제"]);
    let sec = |start: &str, ends: &[&str]| extract_section(sec14_lines, start, ends, mode);

    let (un, name, pg, env);
    if mode == Mode::HpKo {
        un = sec("유엔번호", &["나. 유엔"]);
        name = sec("유엔 적정 선적명", &["다. 운송에서의", "다.운송에서의"]);
        let pg_raw = sec("라. 용기등급", &["마. 해양오염물질", "마.해양오염물질"]);
        let imdg_note = Regex::new(r"(?i)\(\s*IMDG\s*CODE\s*/\s*IATA\s*DGR\s*\)")
            .expect("valid pattern");
        pg = imdg_note.replace_all(&pg_raw, "").replace('-', "").trim().to_string();
        env = sec("마. 해양오염물질", &["바. 사용자", "바.사용자"])
            .replace('-', "")
            .trim()
            .to_string();
    } else {
        un = sec("유엔번호", &["나. 적정선적명"]);
        name = sec("적정선적명", &["다. 운송에서의", "다.운송에서의"]);
        pg = sec("라. 용기등급", &["마. 환경유해성"]);
        env = sec("마. 환경유해성", &["IATA"]);
    }
    let class_raw = sec("다. 운송에서의 위험성 등급", &["라. 용기등급", "라.용기등급"]);

    TransportInfo {
        un_number: un,
        shipping_name: name,
        hazard_class: first_digit(&class_raw),
        packing_group: pg,
        marine_pollutant: env,
    }
}

fn korean_regulatory(lines: &[ClusteredLine], mode: Mode) -> BTreeMap<String, String> {
    let sec15_lines = slice_sections(lines, &["15. 법적규제"], &["16. 그 밖의"]);
    let start_kw = if mode == Mode::HpKo {
        "라. 위험물안전관리법"
    } else {
        "위험물안전관리법"
    };
    let danger = extract_section(sec15_lines, start_kw, &["마. 폐기물", "마.폐기물"], mode);

    let mut sec = BTreeMap::new();
    sec.insert("DANGER".into(), danger);
    sec
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

    fn doc(texts: &[&str]) -> Vec<ClusteredLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| line(t, i as f32 * 20.0))
            .collect()
    }

    #[test]
    fn hazard_classification_stops_at_labelling() {
        let lines = doc(&[
            "2. Hazards identification",
            "Category 3 Skin irritation",
            "2.2 Labelling",
            "Pictogram flame",
        ]);
        let record = build_record(&lines, Mode::CffEn);
        assert!(record
            .hazard_cls
            .iter()
            .any(|l| l.contains("Skin irritation")));
        assert!(!record.hazard_cls.iter().any(|l| l.contains("Pictogram")));
    }

    #[test]
    fn cff_en_category_markers_split_entries() {
        let lines = doc(&[
            "2. Hazards identification",
            "Flammable liquid Category 3 Skin corrosion Category 1A",
            "2.2 Labelling",
        ]);
        let record = build_record(&lines, Mode::CffEn);
        assert_eq!(
            record.hazard_cls,
            vec!["Flammable liquid Category 3", "Skin corrosion Category 1A"]
        );
    }

    #[test]
    fn cff_en_signal_word_from_anywhere() {
        let lines = doc(&["2. Hazards identification", "Signal word : DANGER", "3. Composition"]);
        let record = build_record(&lines, Mode::CffEn);
        assert_eq!(record.signal_word, "Danger");
    }

    #[test]
    fn cff_en_codes_are_bucketed_from_section_two() {
        let lines = doc(&[
            "2. Hazards identification",
            "H315+H320 P264 P264 P301+P312 P403 P501",
            "3. Composition",
        ]);
        let record = build_record(&lines, Mode::CffEn);
        assert_eq!(record.h_codes, vec!["H315+H320"]);
        assert_eq!(record.p_prev, vec!["P264"]);
        assert_eq!(record.p_resp, vec!["P301+P312"]);
        assert_eq!(record.p_stor, vec!["P403"]);
        assert_eq!(record.p_disp, vec!["P501"]);
    }

    #[test]
    fn hp_en_signal_word_is_cleaned() {
        let lines = doc(&["Signal word", "- Danger", "Hazard statement"]);
        let record = build_record(&lines, Mode::HpEn);
        assert_eq!(record.signal_word, "Danger");
    }

    #[test]
    fn hp_en_transport_fields() {
        let lines = doc(&[
            "A. UN No. : 1197",
            "B. Proper shipping name : Extracts, flavouring, liquid (contains ethanol)",
            "C. Hazard Class : 3",
            "D. IMDG : -",
            "Packing group : III",
            "E. Marine pollutant : -",
            "F. Special precautions : none",
        ]);
        let record = build_record(&lines, Mode::HpEn);
        assert_eq!(record.sec14.un_number, "1197");
        assert_eq!(record.sec14.shipping_name, "Extracts, flavouring, liquid");
        assert_eq!(record.sec14.hazard_class, "3");
        assert_eq!(record.sec14.packing_group, "III");
        assert_eq!(record.sec14.marine_pollutant, "");
    }

    #[test]
    fn korean_codes_come_only_from_above_composition() {
        let lines = doc(&[
            "2. 유해성·위험성",
            "H225 P210",
            "3. 성분명 및 함유량",
            "H999 P501",
        ]);
        let record = build_record(&lines, Mode::HpKo);
        assert_eq!(record.h_codes, vec!["H225"]);
        assert_eq!(record.p_prev, vec!["P210"]);
        assert!(record.p_disp.is_empty());
    }

    #[test]
    fn korean_p321_is_rescued() {
        let lines = doc(&["2. 유해성·위험성", "P321", "3. 성분명 및 함유량"]);
        let record = build_record(&lines, Mode::HpKo);
        assert_eq!(record.p_resp, vec!["P321"]);
    }

    #[test]
    fn korean_signal_word_fallback_reads_labelled_row() {
        let lines = doc(&["신호어 : 위험", "3. 성분명 및 함유량"]);
        let record = build_record(&lines, Mode::CffKo);
        assert_eq!(record.signal_word, "위험");
    }

    #[test]
    fn hp_ko_signal_word_between_markers() {
        let lines = doc(&["신호어", "- 경고", "유해·위험 문구", "3. 성분명 및 함유량"]);
        let record = build_record(&lines, Mode::HpKo);
        assert_eq!(record.signal_word, "경고");
    }

    #[test]
    fn hp_ko_hazard_classification_state_machine() {
        let lines = doc(&[
            "2. 유해성·위험성",
            "가. 유해성·위험성 분류",
            "- 인화성 액체 구분3",
            "- 피부 부식성 구분2",
            "나. 예방조치 문구를 포함한 경고표지 항목",
            "3. 성분명 및 함유량",
        ]);
        let record = build_record(&lines, Mode::HpKo);
        assert_eq!(record.hazard_cls, vec!["인화성 액체 구분3", "피부 부식성 구분2"]);
    }

    #[test]
    fn cff_ko_hazard_classification_strips_inline_header() {
        let lines = doc(&[
            "2. 유해성 · 위험성",
            "가. 유해성 · 위험성 분류 인화성 액체 구분3",
            "나. 예방조치문구를 포함한 경고 표지 항목",
            "3. 성분명 및 함유량",
        ]);
        let record = build_record(&lines, Mode::CffKo);
        assert_eq!(record.hazard_cls, vec!["인화성 액체 구분3"]);
    }

    #[test]
    fn cff_ko_shipping_row_merge() {
        let mut lines = vec![
            line("ETHANOL SOLUTION", 100.0),
            line("나. 적정선적명", 110.0),
        ];
        merge_split_shipping_rows(&mut lines);
        assert_eq!(lines[1].text, "나. 적정선적명 ETHANOL SOLUTION");
        assert!(lines[0].text.is_empty());
    }

    #[test]
    fn missing_sections_leave_record_structurally_complete() {
        let record = build_record(&doc(&["nothing relevant"]), Mode::HpEn);
        assert!(record.h_codes.is_empty());
        assert_eq!(record.signal_word, "");
        assert_eq!(record.sec8.get("B156").unwrap(), "no data available");
        assert_eq!(record.sec9.get("B189").unwrap(), "± 0.005");
        assert_eq!(record.sec14.un_number, "");
    }

    #[test]
    fn determinism_over_repeated_builds() {
        let lines = doc(&[
            "2. Hazards identification",
            "Flammable liquid Category 3",
            "Signal word : Danger",
            "H226 P210 P403",
            "3. Composition",
            "Ethanol 64-17-5 10 ~ 20",
            "4. FIRST-AID measures",
        ]);
        let first = build_record(&lines, Mode::CffEn);
        let second = build_record(&lines, Mode::CffEn);
        assert_eq!(first, second);
    }
}
