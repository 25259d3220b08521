//! Term statistics over a collection of pseudo-documents

use std::collections::HashMap;

/// A corpus where each document is a bag of terms
///
/// Terms are compared exactly. `idf` is the natural log of the number of
/// documents over the number of documents containing the term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextCollection {
    documents: Vec<Document>,
    document_frequency: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Document {
    counts: HashMap<String, u64>,
    length: u64,
}

impl TextCollection {
    /// Build from documents given as `(term, occurrences)` lists
    ///
    /// Documents without any occurrence are dropped.
    pub fn new<I, D, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut collection = Self::default();
        for terms in documents {
            let mut document = Document::default();
            for (term, occurrences) in terms {
                if occurrences == 0 {
                    continue;
                }
                *document.counts.entry(term.into()).or_default() += occurrences;
                document.length += occurrences;
            }
            if document.length == 0 {
                continue;
            }
            for term in document.counts.keys() {
                *collection
                    .document_frequency
                    .entry(term.clone())
                    .or_default() += 1;
            }
            collection.documents.push(document);
        }
        collection
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no non-empty document was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// True when any document contains `term`
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    /// Inverse document frequency, `0.0` for unseen terms
    #[must_use]
    pub fn idf(&self, term: &str) -> f64 {
        match self.document_frequency.get(term) {
            Some(&df) if df > 0 => (self.documents.len() as f64 / df as f64).ln(),
            _ => 0.0,
        }
    }

    /// Share of `term` among the terms of document `index`
    #[must_use]
    pub fn tf(&self, term: &str, index: usize) -> f64 {
        self.documents.get(index).map_or(0.0, |document| {
            document.counts.get(term).copied().unwrap_or(0) as f64 / document.length as f64
        })
    }

    /// `tf * idf` of `term` in document `index`
    #[must_use]
    pub fn tf_idf(&self, term: &str, index: usize) -> f64 {
        self.tf(term, index) * self.idf(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> TextCollection {
        TextCollection::new(vec![
            vec![("a", 1), ("b", 1)],
            vec![("a", 2)],
            vec![("c", 0)],
        ])
    }

    #[test]
    fn test_empty_documents_are_dropped() {
        assert_eq!(corpus().len(), 2);
        assert!(!corpus().contains("c"));
    }

    #[test]
    fn test_idf_and_tf() {
        let corpus = corpus();
        assert_eq!(corpus.idf("a"), 0.0);
        assert!((corpus.idf("b") - 2f64.ln()).abs() < 1e-12);
        assert_eq!(corpus.idf("missing"), 0.0);
        assert!((corpus.tf("b", 0) - 0.5).abs() < 1e-12);
        assert!((corpus.tf_idf("b", 0) - 0.5 * 2f64.ln()).abs() < 1e-12);
        assert_eq!(corpus.tf("b", 7), 0.0);
    }
}
