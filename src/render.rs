//! Markdown rendering of research reports.

use crate::models::ResearchReport;
use std::fmt::Write;

/// Renders a report as Markdown. Deterministic given the report; missing
/// optional fields render as empty sections.
pub fn render_markdown(report: &ResearchReport) -> String {
    let mut md = String::new();

    // write! to a String cannot fail
    let _ = writeln!(md, "# Research Report for {}", report.company_name);
    let _ = writeln!(md);
    let _ = writeln!(md, "**Report ID:** {}  ", report.report_id);
    let _ = writeln!(
        md,
        "**Date:** {}  ",
        report.research_date.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(md, "**Status:** {}  ", report.overall_status);
    let _ = writeln!(md, "**Completion:** {}%", report.completion_percentage);
    let _ = writeln!(md);
    let _ = writeln!(md, "## Company Profile");
    if let Some(description) = &report.company_profile.description {
        let _ = writeln!(md, "{}", description);
    }
    let _ = writeln!(md);
    let _ = writeln!(md, "## Key Insights");
    for insight in &report.key_insights {
        let _ = writeln!(md, "- {}", insight);
    }
    let _ = writeln!(md);
    let _ = writeln!(md, "## Recommendations");
    for recommendation in &report.recommendations {
        let _ = writeln!(md, "- {}", recommendation);
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyProfile;
    use chrono::TimeZone;
    use chrono::Utc;

    fn sample_report() -> ResearchReport {
        ResearchReport {
            report_id: "id-123".to_string(),
            company_name: "Acme".to_string(),
            research_date: Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap(),
            overall_status: "completed".to_string(),
            completion_percentage: 100.0,
            company_profile: CompanyProfile {
                name: "Acme".to_string(),
                description: Some("Industrial supplies maker.".to_string()),
                website: None,
            },
            products_services: None,
            market_analysis: None,
            financial_metrics: None,
            key_insights: vec!["Insight one".to_string(), "Insight two".to_string()],
            recommendations: vec!["Verify before deciding.".to_string()],
            credibility: None,
        }
    }

    #[test]
    fn test_render_contains_all_sections() {
        let md = render_markdown(&sample_report());

        assert!(md.contains("# Research Report for Acme"));
        assert!(md.contains("**Report ID:** id-123"));
        assert!(md.contains("**Date:** 2024-07-15 10:00:00 UTC"));
        assert!(md.contains("**Status:** completed"));
        assert!(md.contains("**Completion:** 100%"));
        assert!(md.contains("## Company Profile"));
        assert!(md.contains("Industrial supplies maker."));
        assert!(md.contains("- Insight one"));
        assert!(md.contains("- Insight two"));
        assert!(md.contains("- Verify before deciding."));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        assert_eq!(render_markdown(&report), render_markdown(&report));
    }

    #[test]
    fn test_missing_description_renders_empty_section() {
        let mut report = sample_report();
        report.company_profile.description = None;
        report.key_insights.clear();

        let md = render_markdown(&report);
        assert!(md.contains("## Company Profile"));
        assert!(md.contains("## Key Insights"));
        assert!(!md.contains("Industrial supplies maker."));
    }
}
