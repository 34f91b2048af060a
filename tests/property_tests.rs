/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use email_research_api::credibility::compute_credibility_score;
use email_research_api::extract::CompanyNameExtractor;
use email_research_api::mailbox::RawEmail;
use email_research_api::models::RawMetrics;
use email_research_api::research::extract_json_block;
use proptest::prelude::*;

fn message(sender_header: &str, subject: &str) -> RawEmail {
    RawEmail {
        id: "1".to_string(),
        subject: subject.to_string(),
        sender_header: sender_header.to_string(),
        date: None,
        snippet: String::new(),
    }
}

// Property: for valid (non-negative, in-range) metrics the score stays on
// the [0, 100] scale and carries at most two decimal places
proptest! {
    #[test]
    fn score_bounded_for_valid_metrics(
        age_years in 0.0..=500.0f64,
        market_cap in 0.0..=1e13f64,
        employees in 0u64..=10_000_000,
        domain_age in 0.0..=500.0f64,
        sentiment_score in 0.0..=1.0f64,
        certified in proptest::bool::ANY,
        funded in proptest::bool::ANY,
    ) {
        let metrics = RawMetrics {
            age_years,
            market_cap,
            employees,
            domain_age,
            sentiment_score,
            certified,
            funded_by_top_investors: funded,
        };

        let (score, breakdown) = compute_credibility_score(&metrics);

        prop_assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
        prop_assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);

        for sub in [
            breakdown.age,
            breakdown.market_cap,
            breakdown.employee_count,
            breakdown.domain_age,
            breakdown.online_sentiment,
            breakdown.certifications,
            breakdown.funding_backing,
        ] {
            prop_assert!((0.0..=10.0).contains(&sub), "sub-score out of range: {}", sub);
        }
    }

    #[test]
    fn scorer_never_panics(
        age_years in -1e12..=1e12f64,
        market_cap in -1e12..=1e12f64,
        employees in 0u64..=u64::MAX,
        domain_age in -1e12..=1e12f64,
        sentiment_score in -1e6..=1e6f64,
    ) {
        let metrics = RawMetrics {
            age_years,
            market_cap,
            employees,
            domain_age,
            sentiment_score,
            certified: false,
            funded_by_top_investors: false,
        };

        let _ = compute_credibility_score(&metrics);
    }

    #[test]
    fn saturated_booleans_dominate_zero_metrics(certified in proptest::bool::ANY) {
        let metrics = RawMetrics {
            certified,
            ..RawMetrics::default()
        };

        let (score, _) = compute_credibility_score(&metrics);
        // certifications carry weight 0.10: flipping the flag moves the
        // score by exactly 10 points
        if certified {
            prop_assert_eq!(score, 17.5);
        } else {
            prop_assert_eq!(score, 7.5);
        }
    }
}

// Property: extraction is total and clean over arbitrary header text
proptest! {
    #[test]
    fn extraction_never_panics(sender in "\\PC*", subject in "\\PC*") {
        let extractor = CompanyNameExtractor::heuristic();
        let _ = extractor.extract(&[message(&sender, &subject)]);
    }

    #[test]
    fn extraction_yields_trimmed_non_empty_candidates(sender in "\\PC*", subject in "\\PC*") {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[message(&sender, &subject)]);

        for name in &names {
            prop_assert!(!name.is_empty());
            prop_assert_eq!(name.trim(), name.as_str());
        }
    }

    #[test]
    fn extraction_deduplicates_repeated_messages(sender in "[A-Za-z ]{1,30}", subject in "[A-Za-z ]{0,30}") {
        let extractor = CompanyNameExtractor::heuristic();

        let once = extractor.extract(&[message(&sender, &subject)]);
        let twice = extractor.extract(&[
            message(&sender, &subject),
            message(&sender, &subject),
        ]);

        prop_assert_eq!(once, twice);
    }
}

// Property: JSON block extraction is total and shape-correct
proptest! {
    #[test]
    fn json_extraction_never_panics(text in "\\PC*") {
        let _ = extract_json_block(&text);
    }

    #[test]
    fn extracted_block_is_brace_delimited(text in "\\PC*") {
        if let Some(block) = extract_json_block(&text) {
            prop_assert!(block.starts_with('{'), "block should start with an opening brace");
            prop_assert!(block.ends_with('}'), "block should end with a closing brace");
        }
    }

    #[test]
    fn well_formed_objects_always_extract(key in "[a-z]{1,10}", value in 0i64..=1_000_000) {
        let text = format!("prefix {{\"{}\" : {}}} suffix", key, value);
        let block = extract_json_block(&text);

        prop_assert!(block.is_some());
        let parsed: serde_json::Value = serde_json::from_str(block.unwrap()).unwrap();
        prop_assert_eq!(parsed[key.as_str()].as_i64(), Some(value));
    }
}
