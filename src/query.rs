//! Search input and its validation rules.

use crate::error::{Field, SearchError};
use regex::Regex;
use std::sync::LazyLock;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

/// One inbound lookup: a category and an optional sub-category.
///
/// Construction never fails; [`SearchQuery::validate`] applies the letters-only rule.
/// An empty sub-category is normalised to "none".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    category: String,
    sub_category: Option<String>,
}

impl SearchQuery {
    pub fn new(category: impl Into<String>, sub_category: impl Into<String>) -> Self {
        let sub_category = sub_category.into();
        Self {
            category: category.into(),
            sub_category: (!sub_category.is_empty()).then_some(sub_category),
        }
    }

    /// Query for a category without a sub-category.
    pub fn category_only(category: impl Into<String>) -> Self {
        Self { category: category.into(), sub_category: None }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }

    /// Category must be non-empty latin letters; a present sub-category must be too.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !is_valid_segment(&self.category) {
            return Err(SearchError::InvalidArgument {
                field: Field::Category,
                value: self.category.clone(),
            });
        }
        if let Some(sub) = self.sub_category.as_deref() {
            if !is_valid_segment(sub) {
                return Err(SearchError::InvalidArgument {
                    field: Field::SubCategory,
                    value: sub.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Whether `segment` matches `^[A-Za-z]+$`.
pub fn is_valid_segment(segment: &str) -> bool {
    SEGMENT.is_match(segment)
}
