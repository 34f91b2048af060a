use hex;
use sha2::{Digest, Sha256};

/// Validates cached search responses using SHA-256 checksums.
///
/// Search summaries feed the language-model prompts, so a corrupted cache
/// entry would poison every downstream report for that company. Entries
/// store the originating query alongside the summary and checksum both, so
/// a value surfacing under the wrong key also fails validation and falls
/// back to a fresh fetch.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CachedSearchResult {
    /// The query this summary was fetched for.
    pub query: String,
    /// Concatenated result titles and snippets.
    pub summary: String,
    /// SHA-256 over `query` and `summary` (hex encoded).
    pub checksum: String,
}

impl CachedSearchResult {
    pub fn new(query: String, summary: String) -> Self {
        let checksum = Self::compute_checksum(&query, &summary);
        Self {
            query,
            summary,
            checksum,
        }
    }

    fn compute_checksum(query: &str, summary: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update([0u8]);
        hasher.update(summary.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if the checksum matches the stored query and summary.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.query, &self.summary) == self.checksum
    }

    /// Serializes the entry for storage in the cache.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes a cache entry and validates it against the expected
    /// query. Returns the summary if intact, None if corrupted, mismatched
    /// or invalid JSON.
    pub fn deserialize_and_validate(serialized: &str, expected_query: &str) -> Option<String> {
        let entry: CachedSearchResult = serde_json::from_str(serialized).ok()?;

        if entry.query != expected_query {
            tracing::warn!(
                "Search cache validation failed: entry is for query '{}', expected '{}'",
                entry.query,
                expected_query
            );
            return None;
        }

        if entry.is_valid() {
            Some(entry.summary)
        } else {
            tracing::warn!(
                "Search cache validation failed: checksum mismatch for query '{}'",
                entry.query
            );
            None
        }
    }
}
