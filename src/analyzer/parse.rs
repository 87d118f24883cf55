//! Parsing of free-text model responses into an [`AnalysisResult`]
//!
//! A response is first read as JSON as-is. If that fails it gets exactly one
//! repair: code fences and surrounding prose are dropped by cutting out the
//! first balanced `{...}` object. Anything still unreadable is a parse error.

use crate::analyzer::AnalysisResult;
use crate::analyzer::error::AnalysisError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Categories the model may assign
pub const CATEGORIES: &[&str] = &[
    "technology",
    "market",
    "regulation",
    "competitor",
    "user feedback",
    "industry report",
    "irrelevant",
];

/// Product lines the model may assign
pub const SUB_CATEGORIES: &[&str] = &["hair dryer", "beauty device", "massager", "other"];

/// Category used for anything outside [`CATEGORIES`]
pub const OTHER_CATEGORY: &str = "other";

/// Category marking an article as off-topic
pub const IRRELEVANT_CATEGORY: &str = "irrelevant";

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    category: String,
    #[serde(default)]
    sub_category: String,
    summary: String,
    #[serde(default)]
    keywords: RawKeywords,
    #[serde(alias = "score")]
    value_score: Value,
    #[serde(default, alias = "reason")]
    value_reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKeywords {
    List(Vec<String>),
    Joined(String),
}

impl Default for RawKeywords {
    fn default() -> Self {
        RawKeywords::List(Vec::new())
    }
}

/// Parse a model response, applying at most one repair
pub fn parse_analysis(response: &str) -> Result<AnalysisResult, AnalysisError> {
    let raw = match serde_json::from_str::<RawAnalysis>(response.trim()) {
        Ok(raw) => raw,
        Err(first) => {
            debug!("Response is not bare JSON ({}), attempting repair", first);
            let object = extract_json_object(response).ok_or_else(|| {
                warn!("No JSON object found in analysis response");
                AnalysisError::Parse(format!("no JSON object in response: {}", first))
            })?;
            serde_json::from_str::<RawAnalysis>(object).map_err(|e| {
                warn!("Repaired analysis response is still invalid: {}", e);
                AnalysisError::Parse(e.to_string())
            })?
        }
    };

    let value_score = coerce_score(&raw.value_score)?;
    let keywords = match raw.keywords {
        RawKeywords::List(list) => clean_keywords(list),
        RawKeywords::Joined(joined) => {
            clean_keywords(joined.split([',', '，', ';', '、']).map(str::to_string))
        }
    };

    let summary = raw.summary.trim().to_string();
    if summary.is_empty() {
        return Err(AnalysisError::Parse("empty summary".to_string()));
    }

    Ok(AnalysisResult {
        category: normalize_category(&raw.category),
        sub_category: raw.sub_category.trim().to_string(),
        summary,
        keywords,
        value_score,
        value_reason: raw.value_reason.trim().to_string(),
    })
}

/// Cut the first balanced JSON object out of `text`
///
/// Braces inside string literals are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Read a score from an integer, an integral float, or a numeric string
pub fn coerce_score(value: &Value) -> Result<i64, AnalysisError> {
    let score = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n.as_f64().and_then(integral),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };

    let Some(score) = score else {
        warn!("Non-numeric value score: {}", value);
        return Err(AnalysisError::Parse(format!(
            "value_score is not an integer: {}",
            value
        )));
    };

    if !(0..=100).contains(&score) {
        warn!("Value score {} is out of range", score);
        return Err(AnalysisError::ScoreOutOfRange(score));
    }
    Ok(score)
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Map a model-provided category onto the fixed set
pub fn normalize_category(category: &str) -> String {
    let lower = category.trim().to_lowercase();
    let mapped = match lower.as_str() {
        "tech" | "technology" | "technical innovation" | "innovation" => "technology",
        "market" | "market news" | "market trends" => "market",
        "regulation" | "regulatory" | "policy" => "regulation",
        "competitor" | "competitor analysis" | "competition" => "competitor",
        "user feedback" | "review" | "reviews" => "user feedback",
        "industry report" | "report" => "industry report",
        "irrelevant" | "unrelated" | "not relevant" => IRRELEVANT_CATEGORY,
        _ => OTHER_CATEGORY,
    };
    mapped.to_string()
}

/// Trim, drop empties, and de-duplicate keywords case-insensitively
///
/// Commas are dropped from each keyword since the stored form is
/// comma-separated.
pub fn clean_keywords<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}
