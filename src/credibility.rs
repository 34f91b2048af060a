//! Credibility scoring from estimated business metrics.
//!
//! Pure and total: every input produces a score, there is no error path.
//! Each raw metric normalizes to a sub-score capped at 10, the weighted
//! average is scaled to [0, 100] and rounded to two decimal places.

use crate::models::{RawMetrics, ScoreBreakdown};

/// Factor weights. Must sum to 1.0.
const WEIGHT_AGE: f64 = 0.20;
const WEIGHT_MARKET_CAP: f64 = 0.20;
const WEIGHT_EMPLOYEE_COUNT: f64 = 0.15;
const WEIGHT_DOMAIN_AGE: f64 = 0.10;
const WEIGHT_ONLINE_SENTIMENT: f64 = 0.15;
const WEIGHT_CERTIFICATIONS: f64 = 0.10;
const WEIGHT_FUNDING_BACKING: f64 = 0.10;

/// Computes a credibility score in [0, 100] with its per-factor breakdown.
///
/// Sub-score caps: age saturates at 30 years, market cap at $1B, employee
/// count at 1,000, domain age at 20 years. Sentiment maps [0.0, 1.0] onto
/// [0, 10]; the boolean factors score all-or-nothing. The cap is one-sided,
/// so negative raw values pass through as negative sub-scores.
pub fn compute_credibility_score(metrics: &RawMetrics) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        age: (metrics.age_years / 3.0).min(10.0),
        market_cap: (metrics.market_cap / 1e8).min(10.0),
        employee_count: (metrics.employees as f64 / 100.0).min(10.0),
        domain_age: (metrics.domain_age / 2.0).min(10.0),
        online_sentiment: (metrics.sentiment_score * 10.0).min(10.0),
        certifications: if metrics.certified { 10.0 } else { 0.0 },
        funding_backing: if metrics.funded_by_top_investors {
            10.0
        } else {
            0.0
        },
    };

    let weighted_total = breakdown.age * WEIGHT_AGE
        + breakdown.market_cap * WEIGHT_MARKET_CAP
        + breakdown.employee_count * WEIGHT_EMPLOYEE_COUNT
        + breakdown.domain_age * WEIGHT_DOMAIN_AGE
        + breakdown.online_sentiment * WEIGHT_ONLINE_SENTIMENT
        + breakdown.certifications * WEIGHT_CERTIFICATIONS
        + breakdown.funding_backing * WEIGHT_FUNDING_BACKING;

    // Scale the [0, 10] weighted average to [0, 100], two decimal places
    let final_score = round2(weighted_total * 10.0);

    (final_score, breakdown)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
