use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::category;

pub const UNTITLED: &str = "제목 없음";

/// A service entry exactly as the backend sends it. Every field is optional;
/// scalar values of the wrong type are stringified and falsy ones (`false`,
/// `0`, `""`) count as missing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "서비스ID", default, deserialize_with = "lenient_text")]
    pub service_id: Option<String>,
    #[serde(rename = "정책명", default, deserialize_with = "lenient_text")]
    pub policy_name: Option<String>,
    #[serde(rename = "카테고리", default)]
    pub categories: Value,
    #[serde(rename = "지원대상", default, deserialize_with = "lenient_text")]
    pub support_target: Option<String>,
    #[serde(rename = "참고사항", default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(rename = "상세내용", default, deserialize_with = "lenient_text")]
    pub details: Option<String>,
    #[serde(rename = "링크", default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
    #[serde(rename = "정책링크", default, deserialize_with = "lenient_text")]
    pub policy_link: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub data: Option<Vec<RawRecord>>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(category::scalar_text(&value))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Policy name; doubles as the favorites key.
    pub id: String,
    pub service_id: Option<String>,
    pub title: String,
    pub categories: Vec<String>,
    pub support_target: String,
    pub details: String,
    pub notes: String,
    pub link: String,
}

impl Record {
    pub fn from_raw(raw: RawRecord) -> Self {
        let id = raw.policy_name.unwrap_or_default();
        let title = if id.is_empty() {
            UNTITLED.to_string()
        } else {
            id.clone()
        };
        let link = raw.link.or(raw.policy_link).unwrap_or_default();
        Self {
            id,
            service_id: raw.service_id,
            title,
            categories: category::normalize_value(&raw.categories),
            support_target: raw.support_target.unwrap_or_default(),
            details: raw.details.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
            link,
        }
    }

    /// Lower-cased text the keyword search runs against. Uses the raw policy
    /// name so the untitled placeholder never matches a search.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.id, self.support_target, self.details, self.notes
        )
        .to_lowercase()
    }

    pub fn has_category_ci(&self, label_lower: &str) -> bool {
        self.categories.iter().any(|c| c.to_lowercase() == label_lower)
    }
}

pub fn from_envelope(envelope: RawEnvelope) -> Vec<Record> {
    envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .map(Record::from_raw)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_get_defaults() {
        let r = Record::from_raw(raw(json!({})));
        assert_eq!(r.id, "");
        assert_eq!(r.title, UNTITLED);
        assert!(r.categories.is_empty());
        assert_eq!(r.support_target, "");
        assert_eq!(r.link, "");
    }

    #[test]
    fn link_falls_back_to_policy_link() {
        let r = Record::from_raw(raw(json!({
            "정책명": "청년 월세 지원",
            "정책링크": "https://example.org/b",
        })));
        assert_eq!(r.link, "https://example.org/b");

        let r = Record::from_raw(raw(json!({
            "링크": "https://example.org/a",
            "정책링크": "https://example.org/b",
        })));
        assert_eq!(r.link, "https://example.org/a");
    }

    #[test]
    fn null_and_numeric_fields_are_tolerated() {
        let r = Record::from_raw(raw(json!({
            "서비스ID": 42,
            "정책명": null,
            "지원대상": null,
            "카테고리": "아동, 청소년",
        })));
        assert_eq!(r.service_id.as_deref(), Some("42"));
        assert_eq!(r.title, UNTITLED);
        assert_eq!(r.categories, vec!["아동", "청소년"]);
    }

    #[test]
    fn envelope_without_data_is_empty() {
        let env: RawEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(from_envelope(env).is_empty());
        let env: RawEnvelope = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(from_envelope(env).is_empty());
    }

    #[test]
    fn search_text_is_lowercase() {
        let r = Record::from_raw(raw(json!({
            "정책명": "Youth Rent",
            "상세내용": "Monthly SUPPORT",
        })));
        assert!(r.search_text().contains("monthly support"));
        assert!(r.search_text().contains("youth rent"));
    }

    #[test]
    fn falsy_scalars_count_as_missing() {
        let r = Record::from_raw(raw(json!({
            "서비스ID": 0,
            "정책명": false,
            "링크": false,
            "정책링크": "https://example.org/b",
            "참고사항": true,
        })));
        assert_eq!(r.service_id, None);
        assert_eq!(r.title, UNTITLED);
        assert_eq!(r.link, "https://example.org/b");
        assert_eq!(r.notes, "true");
    }
}
