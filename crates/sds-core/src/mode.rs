use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SdsError;

/// Document dialect: source language crossed with the manufacturer template
/// family the sheet was authored in. Fixed for an entire parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Korean sheet, CFF template family.
    CffKo,
    /// English sheet, CFF template family.
    CffEn,
    /// Korean sheet, HP template family.
    HpKo,
    /// English sheet, HP template family.
    HpEn,
}

/// How surviving section lines are joined back into prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    /// Bullet markers or a vertical gap >= 3.0 start a new output line;
    /// everything else is appended with a single space.
    Latin,
    /// Sentence-final endings and enumeration markers start a new line;
    /// wrapped Hangul is rejoined, inserting a space only after particles
    /// that require a word boundary.
    Korean,
}

/// Immutable per-mode configuration consulted by the section extractor.
pub struct ModeConfig {
    /// Keyword boundary matching ignores case (English dialects only).
    pub case_insensitive_keywords: bool,
    /// Sub-header fragments leaked in from the multi-column source layout,
    /// stripped from the head of every section line.
    pub garbage_heads: &'static [&'static str],
    /// Leading-fragment patterns (bare connectives) that only make sense as
    /// leftovers of a stripped header. Anchored regexes.
    pub sensitive_heads: &'static [&'static str],
    pub join: JoinStyle,
    /// HP Korean sheets bullet every continuation line with "- ".
    pub strip_leading_dash: bool,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::CffKo, Mode::CffEn, Mode::HpKo, Mode::HpEn];

    pub fn config(self) -> &'static ModeConfig {
        match self {
            Mode::CffKo => &CFF_KO,
            Mode::CffEn => &CFF_EN,
            Mode::HpKo => &HP_KO,
            Mode::HpEn => &HP_EN,
        }
    }

    pub fn is_english(self) -> bool {
        matches!(self, Mode::CffEn | Mode::HpEn)
    }

    pub fn cli_name(self) -> &'static str {
        match self {
            Mode::CffKo => "cff-ko",
            Mode::CffEn => "cff-en",
            Mode::HpKo => "hp-ko",
            Mode::HpEn => "hp-en",
        }
    }

    /// Resolve a CLI mode name. Unknown names fail loudly: the keyword and
    /// garbage tables have no sensible default.
    pub fn from_cli_name(s: &str) -> Result<Mode, SdsError> {
        match s.trim().to_lowercase().as_str() {
            "cff-ko" | "cff(k)" => Ok(Mode::CffKo),
            "cff-en" | "cff(e)" => Ok(Mode::CffEn),
            "hp-ko" | "hp(k)" => Ok(Mode::HpKo),
            "hp-en" | "hp(e)" => Ok(Mode::HpEn),
            _ => Err(SdsError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

// ---------------------------------------------------------------------------
// Garbage-header tables
//
// These lists are domain data mined from the source document families, not
// tunable configuration: each entry is a field label that the two-column PDF
// layout interleaves with its value on the same visual row.
// ---------------------------------------------------------------------------

static CFF_EN_GARBAGE: &[&str] = &[
    "Classification of the substance or mixture",
    "Classification of the substance or",
    "mixture",
    "Precautionary statements",
    "Hazard pictograms",
    "Signal word",
    "Hazard statements",
    "Response",
    "Storage",
    "Disposal",
    "Other hazards",
    "General advice",
    "In case of eye contact",
    "In case of skin contact",
    "If inhaled",
    "If swallowed",
    "Special note for doctors",
    "Extinguishing media",
    "Special hazards arising from the",
    "Advice for firefighters",
    "Personal precautions, protective",
    "Environmental precautions",
    "Methods and materials for containment",
    "Precautions for safe handling",
    "Conditions for safe storage, including",
    "Internal regulations",
    "ACGIH regulations",
    "Biological exposure standards",
    "arising from the",
    ", protective",
    "precautions",
    "and materials for containment",
    "for safe handling",
    "for safe storage, including",
    "conditions for safe storage, including",
];

static HP_EN_GARBAGE: &[&str] = &[
    "Classification of the substance or mixture",
    "Classification of the substance or",
    "mixture",
    "Precautionary statements",
    "Hazard pictograms",
    "Signal word",
    "Hazard statements",
    "Response",
    "Storage",
    "Disposal",
    "Other hazards",
    "General advice",
    "In case of eye contact",
    "In case of skin contact",
    "If inhaled",
    "If swallowed",
    "Special note for doctors",
    "Extinguishing media",
    "Special hazards arising from the",
    "Advice for firefighters",
    "Personal precautions, protective",
    "Environmental precautions",
    "Methods and materials for containment",
    "Precautions for safe handling",
    "Conditions for safe storage, including",
    "Internal regulations",
    "ACGIH regulations",
    "Biological exposure standards",
    "arising from the",
    ", protective",
    "precautions",
    "and materials for containment",
    "for safe handling",
    "for safe storage, including",
    "conditions for safe storage, including",
    "equipment and emergency procedures",
    "and cleaning up",
    "any incompatibilities",
    "suitable (unsuitable) extinguishing media",
    "(unsuitable) extinguishing media",
    "specific hazards arising from the chemical",
    "specific hazards",
    "from the chemical",
    "special protective actions for firefighters",
    "special protective",
    "for firefighters",
    "handling",
    "incompatible materials",
    "safe storage",
    "contact with",
    ", including any incompatibilities",
    "including any incompatibilities",
];

static CFF_KO_GARBAGE: &[&str] = &[
    "에 접촉했을 때",
    "에 들어갔을 때",
    "들어갔을 때",
    "접촉했을 때",
    "했을 때",
    "흡입했을 때",
    "먹었을 때",
    "주의사항",
    "내용물",
    "취급요령",
    "저장방법",
    "보호구",
    "조치사항",
    "제거 방법",
    "소화제",
    "유해성",
    "로부터 생기는",
    "착용할 보호구",
    "예방조치",
    "방법",
    "경고표지 항목",
    "그림문자",
    "화학물질",
    "의사의 주의사항",
    "기타 의사의 주의사항",
    "필요한 정보",
    "관한 정보",
    "보호하기 위해 필요한 조치사항",
    "또는 제거 방법",
    "시 착용할 보호구 및 예방조치",
    "시 착용할 보호구",
    "부터 생기는 특정 유해성",
    "사의 주의사항",
    "(부적절한) 소화제",
    "및",
    "요령",
    "때",
    "항의",
    "색상",
    "인화점",
    "비중",
    "굴절률",
    "에 의한 규제",
    "의한 규제",
];

static HP_KO_GARBAGE: &[&str] = &[
    "에 접촉했을 때",
    "에 들어갔을 때",
    "들어갔을 때",
    "접촉했을 때",
    "했을 때",
    "흡입했을 때",
    "먹었을 때",
    "주의사항",
    "내용물",
    "취급요령",
    "저장방법",
    "보호구",
    "조치사항",
    "제거 방법",
    "소화제",
    "유해성",
    "로부터 생기는",
    "착용할 보호구",
    "예방조치",
    "방법",
    "경고표지 항목",
    "그림문자",
    "화학물질",
    "의사의 주의사항",
    "기타 의사의 주의사항",
    "필요한 정보",
    "관한 정보",
    "보호하기 위해 필요한 조치사항",
    "또는 제거 방법",
    "시 착용할 보호구 및 예방조치",
    "시 착용할 보호구",
    "부터 생기는 특정 유해성",
    "사의 주의사항",
    "(부적절한) 소화제",
    "및",
    "요령",
    "때",
    "항의",
    "색상",
    "인화점",
    "비중",
    "굴절률",
    "에 의한 규제",
    "의한 규제",
    "- 색",
    "(및 부적절한) 소화제",
    "특정 유해성",
    "보호하기 위해 필요한 조치 사항 및 보호구",
    "저장 방법",
];

/// Bare connective leftovers seen at line heads after a Korean label strip.
static KO_SENSITIVE: &[&str] = &[r"^시\s+", r"^또는\s+", r"^의\s+"];

static CFF_KO: ModeConfig = ModeConfig {
    case_insensitive_keywords: false,
    garbage_heads: CFF_KO_GARBAGE,
    sensitive_heads: KO_SENSITIVE,
    join: JoinStyle::Korean,
    strip_leading_dash: false,
};

static CFF_EN: ModeConfig = ModeConfig {
    case_insensitive_keywords: true,
    garbage_heads: CFF_EN_GARBAGE,
    sensitive_heads: &[],
    join: JoinStyle::Latin,
    strip_leading_dash: false,
};

static HP_KO: ModeConfig = ModeConfig {
    case_insensitive_keywords: false,
    garbage_heads: HP_KO_GARBAGE,
    sensitive_heads: KO_SENSITIVE,
    join: JoinStyle::Korean,
    strip_leading_dash: true,
};

static HP_EN: ModeConfig = ModeConfig {
    case_insensitive_keywords: true,
    garbage_heads: HP_EN_GARBAGE,
    sensitive_heads: &[],
    join: JoinStyle::Latin,
    strip_leading_dash: false,
};
