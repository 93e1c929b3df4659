//! Host content registry used to resolve [`ContentRef`] selectors.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::node::ContentRef;

/// Catalog-resolved identity of a selector.
///
/// `Index(1)` and the name of entry 1 are the same content and share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ContentKey {
    Empty,
    Entry(usize),
}

/// Names of the content entries a host can place into leaves.
///
/// The engine never interprets content; the catalog only answers whether a
/// selector points at something the host knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentCatalog {
    entries: Vec<String>,
}

impl ContentCatalog {
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Catalog index a selector points at. `Empty` resolves to `None`.
    #[must_use]
    pub fn resolve(&self, content: &ContentRef) -> Option<usize> {
        match content {
            ContentRef::Empty => None,
            ContentRef::Index(index) => (*index < self.entries.len()).then_some(*index),
            ContentRef::Name(name) => self.entries.iter().position(|entry| entry == name),
        }
    }

    /// Whether a selector is usable in a leaf. `Empty` always is.
    #[must_use]
    pub fn contains(&self, content: &ContentRef) -> bool {
        content.is_empty() || self.resolve(content).is_some()
    }

    /// Whether two selectors name the same content, however they are spelled.
    #[must_use]
    pub fn same_entry(&self, first: &ContentRef, second: &ContentRef) -> bool {
        match (self.key(first), self.key(second)) {
            (Ok(first_key), Ok(second_key)) => first_key == second_key,
            _ => first == second,
        }
    }

    pub(crate) fn key(&self, content: &ContentRef) -> Result<ContentKey, ValidationError> {
        if content.is_empty() {
            return Ok(ContentKey::Empty);
        }
        self.resolve(content)
            .map(ContentKey::Entry)
            .ok_or_else(|| ValidationError::UnknownContent {
                content: content.clone(),
            })
    }

    pub(crate) fn check(&self, content: &ContentRef) -> Result<(), ValidationError> {
        if self.contains(content) {
            Ok(())
        } else {
            Err(ValidationError::UnknownContent {
                content: content.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_resolve_by_index_and_name() {
        let catalog = ContentCatalog::new(["editor", "terminal"]);
        assert_eq!(catalog.resolve(&ContentRef::Index(1)), Some(1));
        assert_eq!(catalog.resolve(&ContentRef::from("editor")), Some(0));
        assert_eq!(catalog.resolve(&ContentRef::Index(2)), None);
        assert_eq!(catalog.resolve(&ContentRef::from("log")), None);
        assert!(catalog.contains(&ContentRef::Empty));
        assert!(!catalog.contains(&ContentRef::Index(5)));
    }

    #[test]
    fn index_and_name_of_one_entry_are_the_same_content() {
        let catalog = ContentCatalog::new(["editor", "preview"]);
        assert!(catalog.same_entry(&ContentRef::Index(1), &ContentRef::from("preview")));
        assert!(!catalog.same_entry(&ContentRef::Index(0), &ContentRef::from("preview")));
        assert!(!catalog.same_entry(&ContentRef::Empty, &ContentRef::Index(0)));
        assert_eq!(
            catalog.key(&ContentRef::from("preview")),
            Ok(ContentKey::Entry(1))
        );
        assert_eq!(catalog.key(&ContentRef::Empty), Ok(ContentKey::Empty));
        assert!(catalog.key(&ContentRef::from("log")).is_err());
    }

    #[test]
    fn check_reports_unknown_content() {
        let catalog = ContentCatalog::default();
        assert_eq!(
            catalog.check(&ContentRef::Index(0)),
            Err(ValidationError::UnknownContent {
                content: ContentRef::Index(0)
            })
        );
        assert!(catalog.check(&ContentRef::Empty).is_ok());
    }
}
