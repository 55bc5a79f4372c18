use std::collections::BTreeSet;

use crate::node::{Document, Visitor};

#[derive(Default)]
struct MentionCollector {
    ids: BTreeSet<String>,
}

impl Visitor for MentionCollector {
    fn mention(&mut self, id: Option<&str>, _label: Option<&str>) {
        if let Some(id) = id {
            self.ids.insert(id.to_string());
        }
    }
}

impl Document {
    /// Distinct member identifiers referenced by mention nodes.
    pub fn mentions(&self) -> BTreeSet<String> {
        let mut collector = MentionCollector::default();
        self.walk(&mut collector);
        collector.ids
    }
}

/// Extracts mention identifiers from a stored body.
///
/// Bodies that do not parse as a document yield an empty set; callers still
/// persist the body unchanged.
pub fn extract_mentions(body: &str) -> BTreeSet<String> {
    if body.trim().is_empty() {
        return BTreeSet::new();
    }
    match Document::parse(body) {
        Ok(document) => document.mentions(),
        Err(err) => {
            tracing::warn!(error = %err, "Unparseable rich-text body; indexing no mentions");
            BTreeSet::new()
        }
    }
}
