//! Recommendation ranker.
//!
//! Filters to active sellers, scores each against the conversation, sorts
//! descending with a deterministic tie-break and returns the top N. Pure
//! given the same seller snapshot, so a re-run for the same inputs always
//! yields the same list.

use std::{cmp::Ordering, sync::Arc};

use crate::{
    domain::model::{Conversation, MatchResult, Seller},
    service::{keyword_extractor::KeywordExtractor, match_scorer::score_match},
};

pub const DEFAULT_TOP_N: usize = 3;

pub struct RecommendationRanker {
    extractor: Arc<dyn KeywordExtractor>,
    top_n: usize,
}

impl RecommendationRanker {
    pub fn new(extractor: Arc<dyn KeywordExtractor>, top_n: usize) -> Self {
        Self { extractor, top_n }
    }

    /// Rank the given seller snapshots for one conversation.
    pub fn rank(&self, conversation: &Conversation, sellers: &[Seller]) -> Vec<MatchResult> {
        let keywords = self.extractor.extract(conversation);

        let mut scored: Vec<(MatchResult, &Seller)> = sellers
            .iter()
            .filter(|s| s.is_active())
            .map(|s| (score_match(s, conversation, &keywords), s))
            .collect();

        scored.sort_by(|(ra, sa), (rb, sb)| Self::compare(ra, sa, rb, sb));
        scored
            .into_iter()
            .take(self.top_n)
            .map(|(result, _)| result)
            .collect()
    }

    /// Descending score; ties broken by higher performance, then lower
    /// current load, then seller id.
    fn compare(ra: &MatchResult, sa: &Seller, rb: &MatchResult, sb: &Seller) -> Ordering {
        rb.score
            .cmp(&ra.score)
            .then_with(|| {
                sb.performance_score
                    .partial_cmp(&sa.performance_score)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| sa.current_clients.cmp(&sb.current_clients))
            .then_with(|| sa.id.cmp(&sb.id))
    }
}
