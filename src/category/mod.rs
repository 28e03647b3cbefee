use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

// comma, slash, backslash, pipe, semicolon, ideographic comma, middle dot,
// 2+ whitespace, dash with optional spaces, any whitespace run
const DELIMITER_PATTERN: &str = r"[,/\\|;、·]+|\s{2,}|\s?[-–—]\s?|\s+";

static DELIMITERS: OnceLock<Regex> = OnceLock::new();

fn delimiters() -> &'static Regex {
    DELIMITERS.get_or_init(|| {
        Regex::new(DELIMITER_PATTERN).unwrap_or_else(|e| panic!("invalid delimiter pattern: {e}"))
    })
}

/// Filter labels offered by the front end, grouped the way the catalog
/// is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryGroup {
    pub key: &'static str,
    pub title: &'static str,
    pub labels: &'static [&'static str],
}

pub const CATALOG: &[CategoryGroup] = &[
    CategoryGroup {
        key: "life-cycle",
        title: "Life cycle",
        labels: &[
            "임신", "출산", "영유아", "아동", "청소년", "청년", "중장년", "노인",
        ],
    },
    CategoryGroup {
        key: "household",
        title: "Household",
        labels: &[
            "장애인",
            "여성",
            "한부모",
            "맞벌이",
            "저소득층",
            "보훈대상",
            "다문화",
            "북한이탈주민",
        ],
    },
    CategoryGroup {
        key: "interest",
        title: "Interest",
        labels: &[
            "안전",
            "위기",
            "법률",
            "신체건강",
            "정신건강",
            "문화·여가",
            "생활지원",
            "주거",
            "보육",
            "교육",
            "돌봄",
            "금융",
            "에너지",
            "농어민",
            "디지털",
            "환경·교통",
            "입양·위탁보호",
            "기타",
        ],
    },
];

/// Looks a label up in the catalog, ignoring case and surrounding spaces.
pub fn find_catalog_label(input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    CATALOG
        .iter()
        .flat_map(|g| g.labels.iter().copied())
        .find(|label| label.to_lowercase() == needle)
}

/// Splits every piece on the delimiter pattern and merges the results,
/// keeping the first occurrence of each label.
pub fn normalize<I, S>(pieces: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let re = delimiters();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for piece in pieces {
        for part in re.split(piece.as_ref()) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if seen.insert(part.to_string()) {
                out.push(part.to_string());
            }
        }
    }
    out
}

/// Normalizes a raw category field as it arrives from the data source:
/// a composite string, an array of composite strings, or anything else
/// (treated as absent).
pub fn normalize_value(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => normalize([s.as_str()]),
        Value::Array(items) => normalize(items.iter().filter_map(scalar_text)),
        _ => Vec::new(),
    }
}

/// Text of a loosely typed scalar. Falsy values (`null`, `false`, `0`,
/// `""`) and containers yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
