use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Mailbox Models ============

/// A parsed unread email returned by the fetch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Mailbox-assigned message id (IMAP sequence number).
    pub id: String,
    /// Decoded subject line.
    pub subject: String,
    /// Bare sender address (display name stripped).
    pub sender: String,
    /// Date header, or fetch time when the header is missing/unparseable.
    pub date: DateTime<Utc>,
    /// Plain-text body, truncated to 500 characters.
    pub snippet: String,
}

/// Response payload for the mailbox connect endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
}

/// Response payload for the unread-email fetch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchEmailsResponse {
    pub emails: Vec<EmailMessage>,
}

// ============ Research Models ============

/// Request payload for single-company research.
#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub company_name: String,
}

/// Estimated business metrics normalized from the language model's output.
///
/// Absent or non-numeric source values coerce to the field defaults:
/// numerics to 0, sentiment to 0.5, booleans to false. `age_years` is
/// derived from `founded_year` upstream, so it is never negative when
/// produced by normalization; raw values are otherwise not clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub age_years: f64,
    pub market_cap: f64,
    pub employees: u64,
    pub domain_age: f64,
    pub sentiment_score: f64,
    pub certified: bool,
    pub funded_by_top_investors: bool,
}

impl Default for RawMetrics {
    fn default() -> Self {
        Self {
            age_years: 0.0,
            market_cap: 0.0,
            employees: 0,
            domain_age: 0.0,
            sentiment_score: 0.5,
            certified: false,
            funded_by_top_investors: false,
        }
    }
}

/// Per-factor normalized sub-scores, each in [0, 10] for non-negative input.
///
/// These are the pre-weight values, not weighted contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub age: f64,
    pub market_cap: f64,
    pub employee_count: f64,
    pub domain_age: f64,
    pub online_sentiment: f64,
    pub certifications: f64,
    pub funding_backing: f64,
}

/// A computed credibility score on the [0, 100] scale, with the inputs and
/// the factor breakdown that produced it. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityScore {
    pub score: f64,
    pub raw_metrics: RawMetrics,
    pub score_breakdown: ScoreBreakdown,
}

/// Narrative company profile generated by the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// A completed research run for a single company.
///
/// Identified permanently by `report_id`; never mutated after insertion into
/// the report store. `products_services`, `market_analysis` and
/// `financial_metrics` are reserved extension fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub report_id: String,
    pub company_name: String,
    pub research_date: DateTime<Utc>,
    pub overall_status: String,
    pub completion_percentage: f64,
    pub company_profile: CompanyProfile,
    pub products_services: Option<Vec<serde_json::Value>>,
    pub market_analysis: Option<serde_json::Value>,
    pub financial_metrics: Option<Vec<serde_json::Value>>,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub credibility: Option<CredibilityScore>,
}

/// Response payload for report retrieval: the report plus its Markdown rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub json_report: ResearchReport,
    pub markdown_report: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_metrics_defaults() {
        let metrics = RawMetrics::default();
        assert_eq!(metrics.age_years, 0.0);
        assert_eq!(metrics.market_cap, 0.0);
        assert_eq!(metrics.employees, 0);
        assert_eq!(metrics.domain_age, 0.0);
        assert_eq!(metrics.sentiment_score, 0.5);
        assert!(!metrics.certified);
        assert!(!metrics.funded_by_top_investors);
    }

    #[test]
    fn test_score_breakdown_serializes_factor_names() {
        let breakdown = ScoreBreakdown {
            age: 1.0,
            market_cap: 2.0,
            employee_count: 3.0,
            domain_age: 4.0,
            online_sentiment: 5.0,
            certifications: 10.0,
            funding_backing: 0.0,
        };

        let value = serde_json::to_value(&breakdown).unwrap();
        let map = value.as_object().unwrap();
        for key in [
            "age",
            "market_cap",
            "employee_count",
            "domain_age",
            "online_sentiment",
            "certifications",
            "funding_backing",
        ] {
            assert!(map.contains_key(key), "missing factor key: {}", key);
        }
    }
}
