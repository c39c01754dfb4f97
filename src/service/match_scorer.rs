//! Match scorer: pure, deterministic seller-vs-conversation scoring.
//!
//! Weights sum to 100 (specialty 40, performance 30, availability 20,
//! responsiveness 10) plus an uncapped +5 hot-lead bonus, so totals above
//! 100 are intentional and must not be clamped away. No side effects,
//! no I/O — the keyword set is extracted by the caller.

use std::collections::BTreeSet;

use crate::domain::model::{AvailabilityTier, Conversation, LeadTemperature, MatchResult, Seller};

pub const SPECIALTY_WEIGHT: f64 = 40.0;
pub const PERFORMANCE_WEIGHT: f64 = 30.0;
pub const AVAILABILITY_WEIGHT: f64 = 20.0;
pub const RESPONSIVENESS_WEIGHT: f64 = 10.0;
pub const HOT_LEAD_BONUS: f64 = 5.0;

/// Performance grade from which a seller counts as high-performing.
const HIGH_PERFORMANCE_MIN: f64 = 8.0;
/// Response-time ceiling (seconds) beyond which responsiveness scores zero.
const RESPONSE_TIME_CEILING_SECS: f64 = 300.0;
/// Average response time under which the seller earns the quick-reply reason.
const FAST_RESPONSE_SECS: u32 = 60;

/// Score one seller against one conversation.
///
/// Total over any well-typed inputs: missing specialties or an empty
/// keyword set contribute zero for that factor, `max_concurrent_clients`
/// of zero yields availability zero and tier "baixa" — never an error and
/// never an exclusion (exclusion is caller policy).
pub fn score_match(
    seller: &Seller,
    conversation: &Conversation,
    keywords: &BTreeSet<String>,
) -> MatchResult {
    let mut reasons = Vec::new();
    let mut total = 0.0;

    // Specialty fit: fraction of conversation keywords the seller covers.
    let matched: Vec<&String> = keywords
        .iter()
        .filter(|k| seller.specialties.contains(k.as_str()))
        .collect();
    total += (matched.len() as f64 / keywords.len().max(1) as f64) * SPECIALTY_WEIGHT;
    for keyword in &matched {
        reasons.push(format!("Especialista em {keyword}"));
    }

    total += (seller.performance_score / 10.0) * PERFORMANCE_WEIGHT;
    if seller.performance_score >= HIGH_PERFORMANCE_MIN {
        reasons.push("Alta performance".to_string());
    }

    let rate = seller.availability_rate();
    total += rate * AVAILABILITY_WEIGHT;
    let tier = AvailabilityTier::from_rate(rate);
    match tier {
        AvailabilityTier::Alta => reasons.push("Alta disponibilidade".to_string()),
        AvailabilityTier::Media => reasons.push("Disponibilidade moderada".to_string()),
        AvailabilityTier::Baixa => {}
    }

    let responsiveness = ((RESPONSE_TIME_CEILING_SECS
        - seller.response_time_avg_seconds as f64)
        / RESPONSE_TIME_CEILING_SECS)
        .max(0.0);
    total += responsiveness * RESPONSIVENESS_WEIGHT;
    if seller.response_time_avg_seconds < FAST_RESPONSE_SECS {
        reasons.push("Resposta rápida".to_string());
    }

    if conversation.lead_temperature == LeadTemperature::Hot
        && seller.performance_score >= HIGH_PERFORMANCE_MIN
    {
        total += HOT_LEAD_BONUS;
        reasons.push("Ideal para leads quentes".to_string());
    }

    MatchResult {
        seller_id: seller.id.clone(),
        conversation_id: conversation.id.clone(),
        score: total.round() as u32,
        reasons,
        availability_tier: tier,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::model::{ConversationStatus, SellerStatus};

    fn seller(specialties: &[&str], performance: f64, current: u32, max: u32, rt: u32) -> Seller {
        Seller {
            id: "s1".to_string(),
            name: "Vendedor".to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            performance_score: performance,
            current_clients: current,
            max_concurrent_clients: max,
            response_time_avg_seconds: rt,
            status: SellerStatus::Active,
        }
    }

    fn conversation(temperature: LeadTemperature, keywords: &[&str]) -> Conversation {
        Conversation {
            id: "c1".to_string(),
            client_name: "Cliente".to_string(),
            client_phone: "+5511988887777".to_string(),
            lead_temperature: temperature,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            assigned_seller_id: None,
            status: ConversationStatus::Waiting,
            started_at: Utc::now(),
            last_activity_at: Utc::now(),
        }
    }

    #[test]
    fn worked_example_from_the_sales_desk() {
        // energia specialist, perf 9, 2/10 busy, 50s avg response, hot lead:
        // 40 + 27 + 16 + 8.33 + 5 = 96.33 -> 96
        let s = seller(&["energia"], 9.0, 2, 10, 50);
        let c = conversation(LeadTemperature::Hot, &["energia"]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.score, 96);
        assert_eq!(result.availability_tier, AvailabilityTier::Alta);
        assert!(result.reasons.contains(&"Especialista em energia".to_string()));
        assert!(result.reasons.contains(&"Ideal para leads quentes".to_string()));
    }

    #[test]
    fn specialty_component_is_overlap_fraction_times_weight() {
        // 1 of 2 keywords covered -> 20 specialty points. Zero out the rest:
        // perf 0, full load, slow responder.
        let s = seller(&["b2b"], 0.0, 4, 4, 400);
        let c = conversation(LeadTemperature::Cold, &["b2b", "residencial"]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.score, 20);
    }

    #[test]
    fn no_keywords_scores_zero_specialty_not_error() {
        let s = seller(&["construção"], 0.0, 4, 4, 400);
        let c = conversation(LeadTemperature::Cold, &[]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn zero_capacity_seller_scores_baixa_but_is_not_excluded() {
        let s = seller(&[], 5.0, 0, 0, 400);
        let c = conversation(LeadTemperature::Warm, &[]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.availability_tier, AvailabilityTier::Baixa);
        // performance is the only contribution: 5/10 * 30 = 15
        assert_eq!(result.score, 15);
    }

    #[test]
    fn hot_bonus_can_push_total_above_one_hundred() {
        let s = seller(&["energia"], 10.0, 0, 10, 0);
        let c = conversation(LeadTemperature::Hot, &["energia"]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.score, 105);
    }

    #[test]
    fn score_is_monotonic_in_performance() {
        let c = conversation(LeadTemperature::Warm, &["b2b"]);
        let mut previous = 0;
        for grade in 0..=10 {
            let s = seller(&["b2b"], grade as f64, 1, 5, 120);
            let score = score_match(&s, &c, &c.keywords).score;
            assert!(score >= previous, "score regressed at performance {grade}");
            previous = score;
        }
    }

    #[test]
    fn overloaded_seller_still_scores_availability_zero() {
        // current > max is a soft violation: rate clamps to 0.
        let s = seller(&[], 0.0, 6, 4, 400);
        let c = conversation(LeadTemperature::Cold, &[]);
        let result = score_match(&s, &c, &c.keywords);
        assert_eq!(result.score, 0);
        assert_eq!(result.availability_tier, AvailabilityTier::Baixa);
    }
}
