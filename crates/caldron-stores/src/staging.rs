//! Scratch staging area for raw references and draft documents.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

use crate::document::ResultDocument;
use crate::error::StagingError;

/// Working memory for one request: reference strings (usually URLs) and
/// draft documents. Both collections are FIFO.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingArea {
    #[serde(default)]
    references: VecDeque<String>,
    #[serde(default)]
    documents: VecDeque<ResultDocument>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reference(&mut self, value: impl Into<String>) {
        let value = value.into();
        debug!("Staging reference {}", value);
        self.references.push_back(value);
    }

    /// Oldest reference, removed.
    pub fn pop_reference(&mut self) -> Option<String> {
        self.references.pop_front()
    }

    /// Remove the first reference equal to `value`.
    pub fn remove_reference(&mut self, value: &str) -> bool {
        match self.references.iter().position(|r| r == value) {
            Some(pos) => self.references.remove(pos).is_some(),
            None => false,
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &String> {
        self.references.iter()
    }

    pub fn add_document(&mut self, doc: ResultDocument) -> Result<(), StagingError> {
        if self.get_document(doc.id()).is_some() {
            return Err(StagingError::DuplicateDocument(doc.id()));
        }
        debug!("Staging document {}", doc.tiny());
        self.documents.push_back(doc);
        Ok(())
    }

    pub fn get_document(&self, id: Uuid) -> Option<&ResultDocument> {
        self.documents.iter().find(|d| d.id() == id)
    }

    /// Oldest draft, removed.
    pub fn pop_document(&mut self) -> Option<ResultDocument> {
        self.documents.pop_front()
    }

    pub fn remove_document(&mut self, id: Uuid) -> bool {
        self.take_document(id).is_some()
    }

    /// Remove and return the draft with `id`.
    pub fn take_document(&mut self, id: Uuid) -> Option<ResultDocument> {
        self.take_document_at(id).map(|(_, doc)| doc)
    }

    /// Like [`take_document`](Self::take_document), also returning the draft's
    /// queue position for [`restore_document`](Self::restore_document).
    pub fn take_document_at(&mut self, id: Uuid) -> Option<(usize, ResultDocument)> {
        let pos = self.documents.iter().position(|d| d.id() == id)?;
        self.documents.remove(pos).map(|doc| (pos, doc))
    }

    /// Put a taken draft back at `position`, or at the back if the queue
    /// has since shrunk.
    pub fn restore_document(
        &mut self,
        position: usize,
        doc: ResultDocument,
    ) -> Result<(), StagingError> {
        if self.get_document(doc.id()).is_some() {
            return Err(StagingError::DuplicateDocument(doc.id()));
        }
        let position = position.min(self.documents.len());
        self.documents.insert(position, doc);
        Ok(())
    }

    pub fn documents(&self) -> impl Iterator<Item = &ResultDocument> {
        self.documents.iter()
    }

    /// Copies of every draft and reference, oldest first.
    pub fn list_all(&self) -> (Vec<ResultDocument>, Vec<String>) {
        (
            self.documents.iter().cloned().collect(),
            self.references.iter().cloned().collect(),
        )
    }

    pub fn clear(&mut self) {
        self.references.clear();
        self.documents.clear();
    }

    pub fn references_len(&self) -> usize {
        self.references.len()
    }

    pub fn documents_len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Ingredient;

    fn draft(name: &str) -> ResultDocument {
        ResultDocument::new(name, vec![Ingredient::new("rice", 1.0, "cup")], vec!["Boil".into()])
    }

    #[test]
    fn test_references_fifo() {
        let mut staging = StagingArea::new();
        staging.add_reference("https://a.example");
        staging.add_reference("https://b.example");
        assert_eq!(staging.pop_reference().as_deref(), Some("https://a.example"));
        assert_eq!(staging.pop_reference().as_deref(), Some("https://b.example"));
        assert!(staging.pop_reference().is_none());
    }

    #[test]
    fn test_remove_reference() {
        let mut staging = StagingArea::new();
        staging.add_reference("x");
        assert!(staging.remove_reference("x"));
        assert!(!staging.remove_reference("x"));
    }

    #[test]
    fn test_documents_fifo() {
        let mut staging = StagingArea::new();
        let a = draft("a");
        let b = draft("b");
        staging.add_document(a.clone()).unwrap();
        staging.add_document(b.clone()).unwrap();
        assert_eq!(staging.pop_document(), Some(a));
        assert_eq!(staging.pop_document(), Some(b));
        assert!(staging.pop_document().is_none());
    }

    #[test]
    fn test_duplicate_document_rejected() {
        let mut staging = StagingArea::new();
        let a = draft("a");
        staging.add_document(a.clone()).unwrap();
        assert_eq!(
            staging.add_document(a.clone()),
            Err(StagingError::DuplicateDocument(a.id()))
        );
        assert_eq!(staging.documents_len(), 1);
    }

    #[test]
    fn test_get_take_remove() {
        let mut staging = StagingArea::new();
        let a = draft("a");
        let b = draft("b");
        staging.add_document(a.clone()).unwrap();
        staging.add_document(b.clone()).unwrap();

        assert_eq!(staging.get_document(b.id()), Some(&b));
        assert_eq!(staging.take_document(b.id()), Some(b.clone()));
        assert!(staging.get_document(b.id()).is_none());
        assert!(staging.remove_document(a.id()));
        assert!(!staging.remove_document(a.id()));
        assert!(staging.get_document(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_restore_keeps_queue_position() {
        let mut staging = StagingArea::new();
        let a = draft("a");
        let b = draft("b");
        let c = draft("c");
        for d in [&a, &b, &c] {
            staging.add_document(d.clone()).unwrap();
        }

        let (pos, taken) = staging.take_document_at(b.id()).unwrap();
        assert_eq!(pos, 1);
        staging.restore_document(pos, taken).unwrap();
        assert_eq!(
            staging.restore_document(pos, b.clone()),
            Err(StagingError::DuplicateDocument(b.id()))
        );

        let order: Vec<_> = std::iter::from_fn(|| staging.pop_document()).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_restore_past_end_appends() {
        let mut staging = StagingArea::new();
        let a = draft("a");
        staging.add_document(a.clone()).unwrap();
        let (pos, taken) = staging.take_document_at(a.id()).unwrap();
        staging.restore_document(pos + 5, taken).unwrap();
        assert_eq!(staging.pop_document(), Some(a));
    }

    #[test]
    fn test_list_all_and_clear() {
        let mut staging = StagingArea::new();
        staging.add_reference("r1");
        staging.add_document(draft("d1")).unwrap();
        let (docs, refs) = staging.list_all();
        assert_eq!(docs.len(), 1);
        assert_eq!(refs, vec!["r1".to_string()]);

        staging.clear();
        assert!(staging.is_empty());
    }

    #[test]
    fn test_deserialize_empty_object() {
        let staging: StagingArea = serde_json::from_str("{}").unwrap();
        assert!(staging.is_empty());
    }
}
