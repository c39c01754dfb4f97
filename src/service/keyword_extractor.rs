//! Pluggable conversation classifier.
//!
//! Category inference over free text evolves independently of the scorer,
//! so it lives behind a trait: the ranker extracts once per conversation
//! and hands the scorer a plain keyword set.

use std::collections::{BTreeSet, HashMap};

use crate::domain::model::Conversation;

pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, conversation: &Conversation) -> BTreeSet<String>;
}

/// Uses the keyword set already derived and stored on the conversation.
/// The default extractor: upstream ingestion owns the classification.
pub struct StoredKeywordExtractor;

impl KeywordExtractor for StoredKeywordExtractor {
    fn extract(&self, conversation: &Conversation) -> BTreeSet<String> {
        conversation.keywords.clone()
    }
}

/// Normalizes raw terms into canonical categories through a synonym table,
/// so "obra" and "reforma" both count as the "construção" specialty.
pub struct CategoryKeywordExtractor {
    /// raw term (lowercase) -> canonical category
    synonyms: HashMap<String, String>,
}

impl CategoryKeywordExtractor {
    pub fn new(synonyms: HashMap<String, String>) -> Self {
        Self { synonyms }
    }

    /// Synonym table for the categories the sales desk operates with.
    pub fn with_default_categories() -> Self {
        let mut synonyms = HashMap::new();
        for (term, category) in [
            ("obra", "construção"),
            ("reforma", "construção"),
            ("construção", "construção"),
            ("projeto", "arquitetura"),
            ("planta", "arquitetura"),
            ("arquitetura", "arquitetura"),
            ("empresa", "b2b"),
            ("cnpj", "b2b"),
            ("b2b", "b2b"),
            ("casa", "residencial"),
            ("apartamento", "residencial"),
            ("residencial", "residencial"),
            ("painel", "energia"),
            ("solar", "energia"),
            ("energia", "energia"),
        ] {
            synonyms.insert(term.to_string(), category.to_string());
        }
        Self { synonyms }
    }
}

impl KeywordExtractor for CategoryKeywordExtractor {
    fn extract(&self, conversation: &Conversation) -> BTreeSet<String> {
        conversation
            .keywords
            .iter()
            .filter_map(|raw| self.synonyms.get(raw.to_lowercase().as_str()).cloned())
            .collect()
    }
}
