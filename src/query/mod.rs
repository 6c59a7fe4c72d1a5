//! Query data model: recognized filter fields, parsed queries, subject
//! classification

mod extractor;
mod router;

pub use extractor::FilterExtractor;
pub use router::{Classification, Subject, SubjectIndexes, SubjectRouter};

use std::collections::BTreeMap;

/// Metadata fields a query may filter on
///
/// Closed set: a filter is only ever attached to one of these fields, and
/// only when the query text explicitly mentioned that attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    QuestionNumber,
    Variant,
    SubjectCode,
    Year,
    Months,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::QuestionNumber,
        FilterField::Variant,
        FilterField::SubjectCode,
        FilterField::Year,
        FilterField::Months,
    ];

    /// Field name as it appears in index metadata and service output
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::QuestionNumber => "questionNumber",
            FilterField::Variant => "variant",
            FilterField::SubjectCode => "subjectCode",
            FilterField::Year => "year",
            FilterField::Months => "months",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

/// Equality predicates over metadata fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    fields: BTreeMap<FilterField, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FilterField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

/// A free-text query resolved into filters plus normalized search text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub filters: FilterSet,
    /// Never empty; falls back to the original query text
    pub search_text: String,
}

impl ParsedQuery {
    /// Fallback used when extraction fails or yields nothing usable
    pub fn passthrough(query: &str) -> Self {
        Self {
            filters: FilterSet::new(),
            search_text: query.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in FilterField::ALL {
            assert_eq!(FilterField::from_key(field.as_str()), Some(field));
        }
        assert_eq!(FilterField::from_key("paper"), None);
    }

    #[test]
    fn filter_set_holds_one_value_per_field() {
        let mut filters = FilterSet::new();
        filters.insert(FilterField::Year, "2019");
        filters.insert(FilterField::Year, "2023");

        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get(FilterField::Year), Some("2023"));
    }

    #[test]
    fn passthrough_carries_original_text() {
        let parsed = ParsedQuery::passthrough("questions on magnetism");
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.search_text, "questions on magnetism");
    }
}
