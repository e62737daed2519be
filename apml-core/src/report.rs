//! The value a handler returns.
//!
//! A [`Report`] is presentation-neutral; the binary decides how to lay it out.

use crate::error::DomainError;

/// One line of a report.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A labelled value.
    Field {
        /// Label, including units where relevant.
        label: String,
        /// Formatted value.
        value: String,
    },
    /// Start of a group of related entries.
    Heading(String),
    /// Free text, such as a status message or a help line.
    Note(String),
    /// A line whose read failed while the rest of the report went ahead.
    Failure {
        /// Label of the value that could not be read.
        label: String,
        /// Error returned by the collaborator.
        error: DomainError,
    },
}

/// Ordered, optionally titled collection of [`Entry`] values.
///
/// # Examples
/// ```
/// use apml_core::{DomainError, OobStatus, Report};
///
/// let mut report = Report::titled("SB-TSI REGISTER SUMMARY");
/// report
///     .field("_CPUTEMP", "45.125 °C")
///     .failure("_TSI_REVISION", DomainError::from_status(OobStatus::CmdTimeout));
/// assert_eq!(report.value_of("_CPUTEMP"), Some("45.125 °C"));
/// assert_eq!(report.failures().count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    title: Option<String>,
    entries: Vec<Entry>,
}

impl Report {
    /// Create an untitled, empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty report with a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            entries: Vec::new(),
        }
    }

    /// Append a labelled value.
    pub fn field(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Field {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// Append a heading.
    pub fn heading(&mut self, label: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Heading(label.into()));
        self
    }

    /// Append free text.
    pub fn note(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Note(text.into()));
        self
    }

    /// Append a failed line.
    pub fn failure(&mut self, label: impl Into<String>, error: DomainError) -> &mut Self {
        self.entries.push(Entry::Failure {
            label: label.into(),
            error,
        });
        self
    }

    /// Append every entry of `other`, turning its title into a heading.
    pub fn extend(&mut self, other: Self) -> &mut Self {
        if let Some(title) = other.title {
            self.entries.push(Entry::Heading(title));
        }
        self.entries.extend(other.entries);
        self
    }

    /// Title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Value of the first field labelled `label`.
    #[must_use]
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Field { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    /// Failed lines in insertion order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &DomainError)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Failure { label, error } => Some((label.as_str(), error)),
            _ => None,
        })
    }

    /// Free-text lines in insertion order.
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Note(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Whether the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OobStatus;

    #[test]
    fn extend_turns_titles_into_headings() {
        let mut inner = Report::titled("inner");
        inner.field("a", "1");
        let mut outer = Report::titled("outer");
        outer.note("start").extend(inner);

        assert_eq!(outer.title(), Some("outer"));
        assert_eq!(
            outer.entries(),
            &[
                Entry::Note("start".to_owned()),
                Entry::Heading("inner".to_owned()),
                Entry::Field {
                    label: "a".to_owned(),
                    value: "1".to_owned()
                },
            ]
        );
    }

    #[test]
    fn lookups_skip_other_entry_kinds() {
        let mut report = Report::new();
        report
            .note("Power")
            .failure("Power", DomainError::from_status(OobStatus::NotSupported))
            .field("Power", "12.000");
        assert_eq!(report.value_of("Power"), Some("12.000"));
        assert_eq!(report.notes().collect::<Vec<_>>(), vec!["Power"]);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.code(), 3);
    }
}
