//! Candidate company-name extraction from unread email headers.
//!
//! The extractor strips the address suffix from each sender header and feeds
//! the display name plus subject to a pluggable entity recognizer. When no
//! recognizer is wired in, a word-splitting heuristic over the display name
//! is used instead. The recognizer variant is chosen at construction time.

use crate::mailbox::RawEmail;
use regex::Regex;
use std::collections::HashSet;

/// Entity kinds the extractor accepts as company-name candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Person,
    Place,
    Other,
}

/// A tagged entity produced by a recognizer.
#[derive(Debug, Clone)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

/// Capability interface for named-entity recognition over free text.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

/// Source of company-name candidates for a single message.
pub trait CandidateSource: Send + Sync {
    fn candidates(&self, display_name: &str, subject: &str) -> Vec<String>;
}

/// Candidate source backed by an [`EntityRecognizer`]: runs recognition over
/// `"{display_name} {subject}"` and keeps organization, person and place
/// entities.
pub struct RecognizerCandidates {
    recognizer: Box<dyn EntityRecognizer>,
}

impl RecognizerCandidates {
    pub fn new(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }
}

impl CandidateSource for RecognizerCandidates {
    fn candidates(&self, display_name: &str, subject: &str) -> Vec<String> {
        let text = format!("{} {}", display_name, subject);
        self.recognizer
            .recognize(&text)
            .into_iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EntityKind::Organization | EntityKind::Person | EntityKind::Place
                )
            })
            .map(|e| e.text)
            .collect()
    }
}

/// Heuristic candidate source used when no recognizer is available: the last
/// two words of a multi-word display name, or the single word itself.
pub struct HeuristicNameSplitter;

impl CandidateSource for HeuristicNameSplitter {
    fn candidates(&self, display_name: &str, _subject: &str) -> Vec<String> {
        let words: Vec<&str> = display_name.split_whitespace().collect();
        match words.len() {
            0 => Vec::new(),
            1 => vec![words[0].to_string()],
            n => vec![words[n - 2..].join(" ")],
        }
    }
}

/// Extracts deduplicated candidate company names from a batch of messages.
pub struct CompanyNameExtractor {
    source: Box<dyn CandidateSource>,
    sender_pattern: Regex,
}

impl CompanyNameExtractor {
    /// Builds an extractor using the heuristic word splitter.
    pub fn heuristic() -> Self {
        Self::with_source(Box::new(HeuristicNameSplitter))
    }

    /// Builds an extractor backed by a named-entity recognizer.
    pub fn with_recognizer(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self::with_source(Box::new(RecognizerCandidates::new(recognizer)))
    }

    pub fn with_source(source: Box<dyn CandidateSource>) -> Self {
        Self {
            source,
            sender_pattern: Regex::new(r"^(.*)<.*>").unwrap(),
        }
    }

    /// Returns trimmed, non-empty, exact-deduplicated candidates. First-seen
    /// order is preserved; callers must not rely on ordering.
    pub fn extract(&self, messages: &[RawEmail]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for message in messages {
            let display_name = self.display_name(&message.sender_header);

            for candidate in self.source.candidates(&display_name, &message.subject) {
                let cleaned = candidate.trim().to_string();
                if cleaned.is_empty() {
                    continue;
                }
                if seen.insert(cleaned.clone()) {
                    candidates.push(cleaned);
                }
            }
        }

        candidates
    }

    /// Strips a trailing `<address>` suffix from a sender header, e.g.
    /// `"Jane Doe <jane@acme.com>"` -> `"Jane Doe"`.
    fn display_name(&self, sender_header: &str) -> String {
        match self.sender_pattern.captures(sender_header) {
            Some(caps) => caps[1].trim().to_string(),
            None => sender_header.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(sender_header: &str, subject: &str) -> RawEmail {
        RawEmail {
            id: "1".to_string(),
            subject: subject.to_string(),
            sender_header: sender_header.to_string(),
            date: Some(Utc::now()),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_heuristic_strips_address_suffix() {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[message("Jane Doe <jane@acme.com>", "")]);
        assert_eq!(names, vec!["Jane Doe".to_string()]);
    }

    #[test]
    fn test_heuristic_takes_last_two_words() {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[message("John from Acme Inc <john@acme.com>", "Hello")]);
        assert_eq!(names, vec!["Acme Inc".to_string()]);
    }

    #[test]
    fn test_heuristic_single_word_sender() {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[message("Acme <noreply@acme.com>", "")]);
        assert_eq!(names, vec!["Acme".to_string()]);
    }

    #[test]
    fn test_empty_display_name_yields_nothing() {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[message("<noreply@acme.com>", "subject")]);
        assert!(names.is_empty());
    }

    #[test]
    fn test_deduplicates_exact_matches() {
        let extractor = CompanyNameExtractor::heuristic();
        let names = extractor.extract(&[
            message("Jane Doe <jane@acme.com>", "Intro"),
            message("Jane Doe <jane.doe@other.com>", "Follow-up"),
        ]);
        assert_eq!(names, vec!["Jane Doe".to_string()]);
    }

    struct StubRecognizer;

    impl EntityRecognizer for StubRecognizer {
        fn recognize(&self, text: &str) -> Vec<Entity> {
            let mut entities = Vec::new();
            if text.contains("Acme") {
                entities.push(Entity {
                    text: "Acme Corp".to_string(),
                    kind: EntityKind::Organization,
                });
            }
            entities.push(Entity {
                text: "Tuesday".to_string(),
                kind: EntityKind::Other,
            });
            entities
        }
    }

    #[test]
    fn test_recognizer_filters_entity_kinds() {
        let extractor = CompanyNameExtractor::with_recognizer(Box::new(StubRecognizer));
        let names = extractor.extract(&[message("Jane <jane@acme.com>", "Acme quarterly update")]);
        // Organization kept, Other dropped
        assert_eq!(names, vec!["Acme Corp".to_string()]);
    }

    #[test]
    fn test_recognizer_sees_display_name_and_subject() {
        struct CapturingRecognizer;
        impl EntityRecognizer for CapturingRecognizer {
            fn recognize(&self, text: &str) -> Vec<Entity> {
                vec![Entity {
                    text: text.to_string(),
                    kind: EntityKind::Organization,
                }]
            }
        }

        let extractor = CompanyNameExtractor::with_recognizer(Box::new(CapturingRecognizer));
        let names = extractor.extract(&[message("Jane Doe <jane@acme.com>", "Acme intro")]);
        assert_eq!(names, vec!["Jane Doe Acme intro".to_string()]);
    }
}
