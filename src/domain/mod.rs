//! Record shapes shared by the extraction, normalization and audit stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::common::constants::{RAW_SUFFIX, SOURCE_SUFFIX, SOURCE_UNKNOWN};

/// A verbatim value together with the extraction method that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedValue {
    pub raw: String,
    pub source: String,
}

impl SourcedValue {
    pub fn new(raw: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            source: source.into(),
        }
    }
}

/// Output of a single extraction strategy, keyed by canonical field name
pub type PartialRecord = BTreeMap<String, SourcedValue>;

/// Verbatim, provenance-tagged extraction output (bronze layer).
///
/// Fields are only reachable through read accessors; a record is never
/// modified after the extractor returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BronzeRecord {
    /// Deterministic id derived from the source identifier
    pub record_id: Uuid,
    /// Identifier of the document the record was extracted from
    pub source_url: String,
    /// When extraction ran
    pub extracted_at: DateTime<Utc>,
    fields: BTreeMap<String, SourcedValue>,
}

impl BronzeRecord {
    pub fn new(source_url: &str, extracted_at: DateTime<Utc>, fields: PartialRecord) -> Self {
        Self {
            record_id: record_id_for(source_url),
            source_url: source_url.to_string(),
            extracted_at,
            fields,
        }
    }

    /// Rebuilds a record from the flat `{field}_raw` / `{field}_source` mapping.
    /// A raw value without a companion source is tagged as unknown provenance.
    pub fn from_flat(source_url: &str, flat: &BTreeMap<String, String>) -> Self {
        let fields = flat
            .iter()
            .filter_map(|(key, raw)| {
                let field = key.strip_suffix(RAW_SUFFIX)?;
                let source = flat
                    .get(&format!("{}{}", field, SOURCE_SUFFIX))
                    .map(String::as_str)
                    .unwrap_or(SOURCE_UNKNOWN);
                Some((field.to_string(), SourcedValue::new(raw.clone(), source)))
            })
            .collect();

        Self::new(source_url, Utc::now(), fields)
    }

    pub fn raw(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|v| v.raw.as_str())
    }

    pub fn source(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|v| v.source.as_str())
    }

    pub fn fields(&self) -> &BTreeMap<String, SourcedValue> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The flat string mapping consumed by downstream tooling
    pub fn flat_fields(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .flat_map(|(field, value)| {
                [
                    (format!("{}{}", field, RAW_SUFFIX), value.raw.clone()),
                    (format!("{}{}", field, SOURCE_SUFFIX), value.source.clone()),
                ]
            })
            .collect()
    }
}

pub fn record_id_for(source_url: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, source_url.as_bytes())
}

/// Normalized, typed, unit-converted record (gold layer).
/// Missing inputs stay `None`; nothing is defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldRecord {
    pub height_cm_min: Option<f64>,
    pub height_cm_max: Option<f64>,
    pub flowering_days_min: Option<u32>,
    pub flowering_days_max: Option<u32>,
    pub thc_percentage_min: Option<f64>,
    pub thc_percentage_max: Option<f64>,
    pub cbd_percentage_min: Option<f64>,
    pub cbd_percentage_max: Option<f64>,
    pub sativa_percentage: Option<u32>,
    pub indica_percentage: Option<u32>,
    pub effects_standardized: Option<String>,
    pub flavors_standardized: Option<String>,
    /// Completeness of the weighted key fields, 1-5
    pub confidence_score: u8,
}

impl GoldRecord {
    /// Numeric columns in dataset order
    pub fn numeric_columns(&self) -> [(&'static str, Option<f64>); 11] {
        [
            ("height_cm_min", self.height_cm_min),
            ("height_cm_max", self.height_cm_max),
            ("flowering_days_min", self.flowering_days_min.map(f64::from)),
            ("flowering_days_max", self.flowering_days_max.map(f64::from)),
            ("thc_percentage_min", self.thc_percentage_min),
            ("thc_percentage_max", self.thc_percentage_max),
            ("cbd_percentage_min", self.cbd_percentage_min),
            ("cbd_percentage_max", self.cbd_percentage_max),
            ("sativa_percentage", self.sativa_percentage.map(f64::from)),
            ("indica_percentage", self.indica_percentage.map(f64::from)),
            ("confidence_score", Some(f64::from(self.confidence_score))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BronzeRecord {
        let mut fields = PartialRecord::new();
        fields.insert("height".into(), SourcedValue::new("120-180cm", "Table 1"));
        fields.insert("genetics".into(), SourcedValue::new("60% Sativa", "Pattern matching"));
        BronzeRecord::new("https://example.com/blue-dream", Utc::now(), fields)
    }

    #[test]
    fn flat_fields_pair_every_raw_with_a_source() {
        let flat = sample().flat_fields();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat["height_raw"], "120-180cm");
        assert_eq!(flat["height_source"], "Table 1");
        assert_eq!(flat["genetics_source"], "Pattern matching");
    }

    #[test]
    fn from_flat_restores_fields_and_tags_orphans() {
        let mut flat = sample().flat_fields();
        flat.insert("yield_raw".into(), "500g/m2".into());
        flat.insert("source_url".into(), "ignored".into());

        let rebuilt = BronzeRecord::from_flat("https://example.com/blue-dream", &flat);
        assert_eq!(rebuilt.raw("height"), Some("120-180cm"));
        assert_eq!(rebuilt.source("yield"), Some(SOURCE_UNKNOWN));
        assert_eq!(rebuilt.fields().len(), 3);
        assert_eq!(rebuilt.record_id, sample().record_id);
    }

    #[test]
    fn record_ids_are_stable_per_source() {
        assert_eq!(record_id_for("a"), record_id_for("a"));
        assert_ne!(record_id_for("a"), record_id_for("b"));
    }
}
