//! Post draft rules and read-side helpers.

use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// Long date used by the public feed and the post detail page, e.g. "March 5, 2024".
pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
/// Short date used by the admin table, e.g. "Mar 5, 2024".
pub const SHORT_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// A draft that may not be written to the store.
///
/// Checked in declaration order; the first violation wins.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DraftViolation {
    #[error("Please enter a title")]
    MissingTitle,
    #[error("Please enter a slug")]
    MissingSlug,
    #[error("Please enter some content")]
    MissingContent,
}

impl DraftViolation {
    /// Form field the violation refers to.
    pub fn field(self) -> &'static str {
        match self {
            Self::MissingTitle => "title",
            Self::MissingSlug => "slug",
            Self::MissingContent => "content",
        }
    }
}

pub fn validate_draft(title: &str, slug: &str, content: &str) -> Result<(), DraftViolation> {
    if title.trim().is_empty() {
        return Err(DraftViolation::MissingTitle);
    }
    if slug.trim().is_empty() {
        return Err(DraftViolation::MissingSlug);
    }
    if content.trim().is_empty() {
        return Err(DraftViolation::MissingContent);
    }
    Ok(())
}

/// Optional text fields are stored as null only when left empty.
pub fn empty_to_none(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Split post content into paragraphs on newlines, skipping blank lines.
pub fn content_paragraphs(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

pub fn format_human_date(value: OffsetDateTime) -> String {
    value
        .format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| value.date().to_string())
}

pub fn format_short_date(value: OffsetDateTime) -> String {
    value
        .format(SHORT_DATE_FORMAT)
        .unwrap_or_else(|_| value.date().to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn validation_checks_title_then_slug_then_content() {
        assert_eq!(
            validate_draft("", "", ""),
            Err(DraftViolation::MissingTitle)
        );
        assert_eq!(
            validate_draft("Title", "   ", ""),
            Err(DraftViolation::MissingSlug)
        );
        assert_eq!(
            validate_draft("Title", "title", "\n\t"),
            Err(DraftViolation::MissingContent)
        );
        assert_eq!(validate_draft("Title", "title", "Body"), Ok(()));
    }

    #[test]
    fn violations_carry_distinct_messages() {
        assert_eq!(DraftViolation::MissingTitle.to_string(), "Please enter a title");
        assert_eq!(DraftViolation::MissingSlug.to_string(), "Please enter a slug");
        assert_eq!(
            DraftViolation::MissingContent.to_string(),
            "Please enter some content"
        );
    }

    #[test]
    fn paragraphs_skip_blank_lines() {
        let content = "First line\n\n   \nSecond line\r\nThird";
        assert_eq!(
            content_paragraphs(content),
            vec!["First line", "Second line\r", "Third"]
        );
    }

    #[test]
    fn only_empty_optional_text_becomes_none() {
        assert_eq!(empty_to_none(""), None);
        assert_eq!(empty_to_none(" "), Some(" ".to_string()));
    }

    #[test]
    fn dates_use_long_and_short_month_names() {
        let value = datetime!(2024-03-05 10:15 UTC);
        assert_eq!(format_human_date(value), "March 5, 2024");
        assert_eq!(format_short_date(value), "Mar 5, 2024");
    }
}
