use std::collections::HashSet;

/// Seen-set for one pipeline run. Admission order is the caller's output order.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`. Returns `true` only the first time a key is seen.
    pub fn admit(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }
}
