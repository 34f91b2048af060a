//! Prompt builders for the two language-model calls per company.

pub fn profile_prompt(company_name: &str, search_results: &str) -> String {
    format!(
        "Write a concise factual company profile for '{}' using this data:\n\n{}",
        company_name, search_results
    )
}

/// Asks for a strict JSON object of estimated metrics. The response is still
/// treated as untrusted free text downstream: the first top-level JSON object
/// is extracted by brace matching, with a fixed fallback on failure.
pub fn metrics_prompt(company_name: &str, search_results: &str) -> String {
    format!(
        r#"Based on this info about '{name}', estimate realistic values for the following metrics.
Respond ONLY with JSON in this format (no extra text):
{{
  "founded_year": 2004,
  "market_cap": 150000000000,
  "employees": 10000,
  "domain_age": 15,
  "sentiment_score": 0.85,
  "certified": true,
  "funded_by_top_investors": true
}}

Search results:
{results}"#,
        name = company_name,
        results = search_results
    )
}
