use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the section 3 composition table.
///
/// `cas` is normalized to `\d{2,7}-\d{2}-\d` with internal spaces removed;
/// `concentration` is a single percentage or a `"lo ~ hi"` range, both
/// bounded by 100. A row with both fields empty is never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub cas: String,
    pub concentration: String,
}

/// Section 14 transport classification fields.
///
/// Serialized under the legacy short names consumed by the downstream
/// template-filling tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportInfo {
    #[serde(rename = "UN")]
    pub un_number: String,
    #[serde(rename = "NAME")]
    pub shipping_name: String,
    #[serde(rename = "CLASS")]
    pub hazard_class: String,
    #[serde(rename = "PG")]
    pub packing_group: String,
    #[serde(rename = "ENV")]
    pub marine_pollutant: String,
}

/// Structured output of a single document parse.
///
/// Always structurally complete: a section missing from the source document
/// leaves its field at the empty default rather than being absent. The
/// free-text maps are keyed by the stable cell-reference identifiers the
/// downstream spreadsheet writer expects (B125..B189).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsdsRecord {
    pub hazard_cls: Vec<String>,
    pub signal_word: String,
    pub h_codes: Vec<String>,
    pub p_prev: Vec<String>,
    pub p_resp: Vec<String>,
    pub p_stor: Vec<String>,
    pub p_disp: Vec<String>,
    pub composition_data: Vec<CompositionEntry>,
    /// First-aid, firefighting, accidental-release and handling sections.
    pub sec4_to_7: BTreeMap<String, String>,
    /// Exposure limits.
    pub sec8: BTreeMap<String, String>,
    /// Physical and chemical properties.
    pub sec9: BTreeMap<String, String>,
    pub sec14: TransportInfo,
    /// Regulatory section (dangerous-goods act classification).
    pub sec15: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_structurally_complete() {
        let record = MsdsRecord::default();
        assert!(record.hazard_cls.is_empty());
        assert!(record.signal_word.is_empty());
        assert!(record.sec14.un_number.is_empty());
    }

    #[test]
    fn transport_serializes_legacy_names() {
        let info = TransportInfo {
            un_number: "1197".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"UN\":\"1197\""));
        assert!(json.contains("\"NAME\""));
    }
}
