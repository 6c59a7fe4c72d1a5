//! Filter extraction via the language-understanding service
//!
//! Turns a free-text query into equality filters over the recognized
//! metadata fields plus a search string. Extraction never fails: any
//! malformed or missing service output degrades to a passthrough query so
//! retrieval can always proceed.

use crate::providers::LanguageModel;
use crate::query::{FilterField, FilterSet, ParsedQuery};
use chrono::Datelike;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Shape the service is instructed to return
#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    filters: HashMap<String, Value>,
    #[serde(default)]
    search_text: String,
}

/// Extracts structured filters from free-text queries
pub struct FilterExtractor {
    model: Arc<dyn LanguageModel>,
    fenced_json: Regex,
    current_year: i32,
}

impl FilterExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            fenced_json: Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")
                .expect("fenced JSON pattern is valid"),
            current_year: chrono::Utc::now().year(),
        }
    }

    /// Extract explicitly stated filters from a query
    ///
    /// Fields the query never mentions are omitted entirely; absence is
    /// never inferred. Service failures and unparseable responses are
    /// logged and absorbed, returning the query unchanged with no filters.
    pub fn extract(&self, query: &str) -> ParsedQuery {
        let prompt = build_prompt(query);
        let response = match self.model.complete(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Filter extraction call failed, passing query through: {e}");
                return ParsedQuery::passthrough(query);
            }
        };

        match self.parse_response(&response, query) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Unparseable extraction response, passing query through: {e}");
                ParsedQuery::passthrough(query)
            }
        }
    }

    fn parse_response(&self, response: &str, query: &str) -> anyhow::Result<ParsedQuery> {
        let json = self
            .locate_json(response)
            .ok_or_else(|| anyhow::anyhow!("no JSON object in response"))?;
        let raw: RawExtraction = serde_json::from_str(json)?;

        let mut filters = FilterSet::new();
        for (key, value) in &raw.filters {
            let Some(field) = FilterField::from_key(key) else {
                // Unrecognized fields are dropped, not errors
                continue;
            };
            if let Some(normalized) = self.normalize(field, value) {
                filters.insert(field, normalized);
            }
        }

        let search_text = raw.search_text.trim();
        let search_text = if search_text.is_empty() {
            query.to_string()
        } else {
            search_text.to_string()
        };

        Ok(ParsedQuery {
            filters,
            search_text,
        })
    }

    /// Find a JSON object in prose-wrapped service output
    ///
    /// Prefers a fenced code block; otherwise takes the first balanced
    /// top-level object.
    fn locate_json<'a>(&self, response: &'a str) -> Option<&'a str> {
        if let Some(captures) = self.fenced_json.captures(response) {
            return captures.get(1).map(|m| m.as_str());
        }
        balanced_object(response)
    }

    fn normalize(&self, field: FilterField, value: &Value) -> Option<String> {
        let text = match value {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            // The months field sometimes comes back as a list; keep the first
            Value::Array(items) => items.iter().find_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })?,
            _ => return None,
        };

        match field {
            FilterField::Year => Some(self.normalize_year(&text)),
            FilterField::Months => Some(first_month(&text)),
            _ => Some(text),
        }
    }

    fn normalize_year(&self, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.to_ascii_lowercase().contains("recent") {
            return (self.current_year - 2).to_string();
        }
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return format!("20{trimmed}");
        }
        trimmed.to_string()
    }
}

fn build_prompt(query: &str) -> String {
    format!(
        r#"Analyze the query and STRICTLY extract ONLY EXPLICITLY MENTIONED filters:
- questionNumber: extract as string if a specific question is numbered
- variant: extract as string if a version/variant is specified
- subjectCode: 4-digit code as string (e.g. "5054")
- year: four digits; expand two-digit years ("19" means "2019"); "recent" means the current year minus 2
- months: full month name; expand abbreviations ("Nov" means "November"); if several months are stated keep only the first

If a filter is not explicitly mentioned, OMIT IT COMPLETELY from the JSON.

Query: "{query}"

Return JSON with:
{{
    "filters": {{
        // only the filters present in the query
    }},
    "search_text": "full original query"
}}"#
    )
}

/// First balanced top-level JSON object in `text`
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
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

/// First month named in `value`, canonicalized to its full name
fn first_month(value: &str) -> String {
    for word in value.split(|c: char| !c.is_ascii_alphabetic()) {
        if word.len() >= 3 {
            if let Some(name) = month_name(word) {
                return name.to_string();
            }
        }
    }
    value.trim().to_string()
}

fn month_name(word: &str) -> Option<&'static str> {
    let lower = word.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .find(|name| name.to_ascii_lowercase().starts_with(&lower))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LanguageModelError;

    struct StubModel {
        reply: Result<String, String>,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("boom".to_string()),
            })
        }
    }

    impl LanguageModel for StubModel {
        fn complete(&self, _prompt: &str) -> Result<String, LanguageModelError> {
            self.reply
                .clone()
                .map_err(LanguageModelError::RequestFailed)
        }
    }

    fn extract_with(reply: &str, query: &str) -> ParsedQuery {
        FilterExtractor::new(StubModel::replying(reply)).extract(query)
    }

    #[test]
    fn extracts_filters_from_fenced_json() {
        let parsed = extract_with(
            "Here you go:\n```json\n{\"filters\": {\"variant\": \"12\", \"subjectCode\": \"5054\"}, \"search_text\": \"physics variant 12\"}\n```\nThanks!",
            "physics variant 12 from 5054",
        );

        assert_eq!(parsed.filters.len(), 2);
        assert_eq!(parsed.filters.get(FilterField::Variant), Some("12"));
        assert_eq!(parsed.filters.get(FilterField::SubjectCode), Some("5054"));
        assert_eq!(parsed.search_text, "physics variant 12");
    }

    #[test]
    fn extracts_from_prose_wrapped_json() {
        let parsed = extract_with(
            "Sure! The extraction is {\"filters\": {\"year\": \"2021\"}, \"search_text\": \"2021 questions\"} as requested.",
            "2021 questions",
        );

        assert_eq!(parsed.filters.get(FilterField::Year), Some("2021"));
    }

    #[test]
    fn malformed_response_degrades_to_passthrough() {
        let parsed = extract_with("I could not understand the query, sorry.", "find q5");

        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.search_text, "find q5");
    }

    #[test]
    fn service_failure_degrades_to_passthrough() {
        let extractor = FilterExtractor::new(StubModel::failing());
        let parsed = extractor.extract("find q5");

        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.search_text, "find q5");
    }

    #[test]
    fn unrecognized_fields_are_dropped() {
        let parsed = extract_with(
            "{\"filters\": {\"paper\": \"1\", \"variant\": \"11\"}, \"search_text\": \"paper 1 variant 11\"}",
            "paper 1 variant 11",
        );

        assert_eq!(parsed.filters.len(), 1);
        assert_eq!(parsed.filters.get(FilterField::Variant), Some("11"));
    }

    #[test]
    fn two_digit_year_expands() {
        let parsed = extract_with(
            "{\"filters\": {\"year\": \"19\"}, \"search_text\": \"questions from 19\"}",
            "questions from 19",
        );

        assert_eq!(parsed.filters.get(FilterField::Year), Some("2019"));
    }

    #[test]
    fn recent_year_resolves_relative_to_today() {
        let parsed = extract_with(
            "{\"filters\": {\"year\": \"recent\"}, \"search_text\": \"recent questions\"}",
            "recent questions",
        );

        let expected = (chrono::Utc::now().year() - 2).to_string();
        assert_eq!(parsed.filters.get(FilterField::Year), Some(expected.as_str()));
    }

    #[test]
    fn numeric_year_value_is_stringified() {
        let parsed = extract_with(
            "{\"filters\": {\"year\": 2020, \"questionNumber\": 5}, \"search_text\": \"q5 2020\"}",
            "q5 2020",
        );

        assert_eq!(parsed.filters.get(FilterField::Year), Some("2020"));
        assert_eq!(parsed.filters.get(FilterField::QuestionNumber), Some("5"));
    }

    #[test]
    fn month_abbreviation_canonicalizes() {
        let parsed = extract_with(
            "{\"filters\": {\"months\": \"Nov\"}, \"search_text\": \"Nov paper\"}",
            "Nov paper",
        );

        assert_eq!(parsed.filters.get(FilterField::Months), Some("November"));
    }

    #[test]
    fn only_first_month_is_kept() {
        let parsed = extract_with(
            "{\"filters\": {\"months\": \"June and November\"}, \"search_text\": \"summer and winter papers\"}",
            "summer and winter papers",
        );

        assert_eq!(parsed.filters.get(FilterField::Months), Some("June"));

        let parsed = extract_with(
            "{\"filters\": {\"months\": [\"October\", \"November\"]}, \"search_text\": \"autumn papers\"}",
            "autumn papers",
        );

        assert_eq!(parsed.filters.get(FilterField::Months), Some("October"));
    }

    #[test]
    fn null_and_empty_values_are_omitted() {
        let parsed = extract_with(
            "{\"filters\": {\"year\": null, \"variant\": \"  \"}, \"search_text\": \"anything\"}",
            "anything",
        );

        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn empty_search_text_falls_back_to_query() {
        let parsed = extract_with(
            "{\"filters\": {}, \"search_text\": \"\"}",
            "questions on waves",
        );

        assert_eq!(parsed.search_text, "questions on waves");
    }
}
