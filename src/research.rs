//! Research orchestration: search, profile generation, metric estimation,
//! scoring and report assembly for a single company.
//!
//! One engine call produces one immutable report in the store. Failures are
//! typed so batch callers can skip the company and continue.

use crate::circuit_breaker::create_research_circuit_breaker;
use crate::config::Config;
use crate::credibility::compute_credibility_score;
use crate::errors::{AppError, ResultExt};
use crate::models::{CompanyProfile, CredibilityScore, RawMetrics, ResearchReport};
use crate::prompts::{metrics_prompt, profile_prompt};
use crate::report_store::ReportStore;
use crate::services::{LlmService, SearchService};
use chrono::{Datelike, Utc};
use failsafe::futures::CircuitBreaker;
use moka::future::Cache;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Age assumed when a `founded_year` value is present but unparseable.
const DEFAULT_AGE_YEARS: f64 = 5.0;

/// Outcome of metric extraction from the model's free-form response.
///
/// Parse failures never propagate past this boundary; they substitute the
/// fixed fallback metric set.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsOutcome {
    Parsed(RawMetrics),
    Fallback(RawMetrics),
}

impl MetricsOutcome {
    /// Extracts and normalizes metrics from a model response, falling back
    /// to the fixed defaults when no JSON object can be recovered.
    pub fn from_response(text: &str, current_year: i32) -> Self {
        let parsed = extract_json_block(text)
            .and_then(|block| serde_json::from_str::<Value>(block).ok())
            .and_then(|value| value.as_object().cloned());

        match parsed {
            Some(map) => MetricsOutcome::Parsed(normalize_metrics(&map, current_year)),
            None => MetricsOutcome::Fallback(fallback_metrics()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MetricsOutcome::Fallback(_))
    }

    pub fn into_metrics(self) -> RawMetrics {
        match self {
            MetricsOutcome::Parsed(metrics) | MetricsOutcome::Fallback(metrics) => metrics,
        }
    }
}

/// Fixed metric set substituted when the model's JSON cannot be recovered.
pub fn fallback_metrics() -> RawMetrics {
    RawMetrics {
        age_years: 5.0,
        market_cap: 1e9,
        employees: 500,
        domain_age: 5.0,
        sentiment_score: 0.6,
        certified: true,
        funded_by_top_investors: false,
    }
}

/// Returns the first top-level JSON object in `text`, located by brace
/// matching that is aware of strings and escapes.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalizes a parsed metrics object via safe coercion: absent or
/// non-numeric values become their defaults, and `founded_year` is replaced
/// by `age_years = max(current_year - founded_year, 0)`.
pub fn normalize_metrics(raw: &Map<String, Value>, current_year: i32) -> RawMetrics {
    let age_years = match raw.get("founded_year") {
        Some(value) => match parse_year(value) {
            Some(year) => (current_year - year).max(0) as f64,
            None => {
                tracing::warn!("Failed to convert founded_year to age_years: {:?}", value);
                DEFAULT_AGE_YEARS
            }
        },
        None => number_or(raw.get("age_years"), 0.0),
    };

    RawMetrics {
        age_years,
        market_cap: number_or(raw.get("market_cap"), 0.0),
        employees: count_or(raw.get("employees")),
        domain_age: number_or(raw.get("domain_age"), 0.0),
        sentiment_score: number_or(raw.get("sentiment_score"), 0.5),
        certified: raw
            .get("certified")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        funded_by_top_investors: raw
            .get("funded_by_top_investors")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(default)
}

fn count_or(value: Option<&Value>) -> u64 {
    value
        .and_then(Value::as_f64)
        .map(|f| f.max(0.0).round() as u64)
        .unwrap_or(0)
}

fn parse_year(value: &Value) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    value.as_str().and_then(|s| s.trim().parse::<i32>().ok())
}

fn guard_err(e: failsafe::Error<AppError>) -> AppError {
    match e {
        failsafe::Error::Inner(inner) => inner,
        failsafe::Error::Rejected => AppError::ExternalApiError(
            "Research circuit open, upstream calls suspended".to_string(),
        ),
    }
}

/// Runs the research pipeline for single companies and stores the results.
pub struct ResearchEngine {
    search: SearchService,
    llm: LlmService,
    store: ReportStore,
    current_year: i32,
}

impl ResearchEngine {
    pub fn new(config: &Config, search_cache: Cache<String, String>, store: ReportStore) -> Self {
        Self {
            search: SearchService::new(config, search_cache),
            llm: LlmService::new(config),
            store,
            current_year: Utc::now().year(),
        }
    }

    /// Pins the year used for the `founded_year` conversion. Test seam.
    pub fn with_current_year(mut self, current_year: i32) -> Self {
        self.current_year = current_year;
        self
    }

    /// Researches a single company and returns the stored report.
    ///
    /// `breaker` guards the three upstream calls; a rejected or failed call
    /// surfaces as `AppError::ExternalApiError`. Batch callers must treat a
    /// failure as "skip this company", never as fatal.
    pub async fn research_company<C>(
        &self,
        breaker: &C,
        company_name: &str,
    ) -> Result<ResearchReport, AppError>
    where
        C: CircuitBreaker,
    {
        tracing::info!("Starting research for: {}", company_name);

        let query = format!("{} company profile", company_name);
        let search_results = breaker
            .call(self.search.search(&query))
            .await
            .map_err(guard_err)
            .context(format!("Search failed for '{}'", company_name))?;

        // Step 1: narrative company profile
        let profile_text = breaker
            .call(self.llm.complete(&profile_prompt(company_name, &search_results)))
            .await
            .map_err(guard_err)
            .context(format!("Profile generation failed for '{}'", company_name))?;

        // Step 2: estimated metrics as strict JSON
        let metrics_response = breaker
            .call(self.llm.complete(&metrics_prompt(company_name, &search_results)))
            .await
            .map_err(guard_err)
            .context(format!("Metric estimation failed for '{}'", company_name))?;
        tracing::debug!("Raw model metrics response:\n{}", metrics_response);

        let outcome = MetricsOutcome::from_response(&metrics_response, self.current_year);
        if outcome.is_fallback() {
            tracing::warn!(
                "Using fallback metrics for '{}': model response had no parseable JSON",
                company_name
            );
        }
        let metrics = outcome.into_metrics();
        tracing::info!("Normalized metrics for '{}': {:?}", company_name, metrics);

        // Step 3: score calculation
        let (score, breakdown) = compute_credibility_score(&metrics);

        // Step 4: assemble and store the report
        let report = ResearchReport {
            report_id: Uuid::new_v4().to_string(),
            company_name: company_name.to_string(),
            research_date: Utc::now(),
            overall_status: "completed".to_string(),
            completion_percentage: 100.0,
            company_profile: CompanyProfile {
                name: company_name.to_string(),
                description: Some(profile_text),
                website: None,
            },
            products_services: None,
            market_analysis: None,
            financial_metrics: Some(vec![json!({"credibility_score": score})]),
            key_insights: vec![
                "Generated using Serper search + OpenAI estimation".to_string(),
                format!("Credibility Score: {}", score),
            ],
            recommendations: vec![
                "Verify insights with official sources for critical decisions.".to_string(),
            ],
            credibility: Some(CredibilityScore {
                score,
                raw_metrics: metrics,
                score_breakdown: breakdown,
            }),
        };

        self.store.insert(report.clone());
        tracing::info!(
            "Completed research for {} - score: {}, report: {}",
            company_name,
            score,
            report.report_id
        );

        Ok(report)
    }

    /// Researches a batch of companies sequentially. One company's failure
    /// never aborts the rest; failures are logged and omitted.
    pub async fn research_all(&self, company_names: &[String]) -> Vec<ResearchReport> {
        let breaker = create_research_circuit_breaker();
        let mut reports = Vec::new();

        for name in company_names {
            match self.research_company(&breaker, name).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!("Research failed for '{}', skipping: {}", name, e);
                }
            }
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_block_plain_object() {
        let text = r#"{"founded_year": 2010}"#;
        assert_eq!(extract_json_block(text), Some(text));
    }

    #[test]
    fn test_extract_json_block_with_surrounding_prose() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nanything else?";
        assert_eq!(extract_json_block(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_block_takes_first_top_level_object() {
        let text = r#"{"a": {"nested": 1}} trailing {"b": 2}"#;
        assert_eq!(extract_json_block(text), Some(r#"{"a": {"nested": 1}}"#));
    }

    #[test]
    fn test_extract_json_block_ignores_braces_in_strings() {
        let text = r#"{"note": "uses { and } inside"}"#;
        assert_eq!(extract_json_block(text), Some(text));
    }

    #[test]
    fn test_extract_json_block_none_without_object() {
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("{unclosed"), None);
    }

    fn metrics_map(json: &str) -> Map<String, Value> {
        serde_json::from_str::<Value>(json)
            .unwrap()
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_founded_year_converts_to_age() {
        let raw = metrics_map(r#"{"founded_year": 2010}"#);
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.age_years, 14.0);
    }

    #[test]
    fn test_future_founded_year_floors_at_zero() {
        let raw = metrics_map(r#"{"founded_year": 2030}"#);
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.age_years, 0.0);
    }

    #[test]
    fn test_unparseable_founded_year_defaults_to_five() {
        let raw = metrics_map(r#"{"founded_year": "around the nineties"}"#);
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.age_years, 5.0);
    }

    #[test]
    fn test_founded_year_as_string_parses() {
        let raw = metrics_map(r#"{"founded_year": "2004"}"#);
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.age_years, 20.0);
    }

    #[test]
    fn test_missing_fields_coerce_to_defaults() {
        let raw = metrics_map(r#"{}"#);
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics, RawMetrics::default());
    }

    #[test]
    fn test_non_numeric_values_coerce_to_defaults() {
        let raw = metrics_map(
            r#"{"market_cap": "huge", "employees": "many", "sentiment_score": null, "certified": "yes"}"#,
        );
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.market_cap, 0.0);
        assert_eq!(metrics.employees, 0);
        assert_eq!(metrics.sentiment_score, 0.5);
        assert!(!metrics.certified);
    }

    #[test]
    fn test_full_metrics_object_normalizes() {
        let raw = metrics_map(
            r#"{
                "founded_year": 2004,
                "market_cap": 150000000000,
                "employees": 10000,
                "domain_age": 15,
                "sentiment_score": 0.85,
                "certified": true,
                "funded_by_top_investors": true
            }"#,
        );
        let metrics = normalize_metrics(&raw, 2024);
        assert_eq!(metrics.age_years, 20.0);
        assert_eq!(metrics.market_cap, 150_000_000_000.0);
        assert_eq!(metrics.employees, 10_000);
        assert_eq!(metrics.domain_age, 15.0);
        assert_eq!(metrics.sentiment_score, 0.85);
        assert!(metrics.certified);
        assert!(metrics.funded_by_top_investors);
    }

    #[test]
    fn test_outcome_parses_json_with_prose() {
        let response = "Sure! {\"founded_year\": 2014, \"employees\": 50}";
        let outcome = MetricsOutcome::from_response(response, 2024);

        assert!(!outcome.is_fallback());
        let metrics = outcome.into_metrics();
        assert_eq!(metrics.age_years, 10.0);
        assert_eq!(metrics.employees, 50);
    }

    #[test]
    fn test_outcome_falls_back_on_garbage() {
        let outcome = MetricsOutcome::from_response("I cannot answer that.", 2024);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_metrics(), fallback_metrics());
    }

    #[test]
    fn test_outcome_falls_back_on_non_object_json() {
        let outcome = MetricsOutcome::from_response("[1, 2, 3]", 2024);
        assert!(outcome.is_fallback());
    }
}
