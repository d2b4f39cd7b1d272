// SPDX-License-Identifier: Apache-2.0

use crate::hash_key::HashKey;

/// Runtime knobs for a [`Parser`](crate::Parser).
///
/// Compile-time defaults come from Cargo features: `comments` decides
/// whether `//` comments are accepted unless overridden here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest allowed nesting of objects and arrays. `None` is unbounded.
    pub max_depth: Option<usize>,
    pub allow_comments: bool,
    /// Key for every map built during the parse. `None` uses the
    /// process-wide key.
    pub hash_key: Option<HashKey>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            allow_comments: cfg!(feature = "comments"),
            hash_key: None,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_comments(mut self, allow_comments: bool) -> Self {
        self.allow_comments = allow_comments;
        self
    }

    pub fn with_hash_key(mut self, hash_key: HashKey) -> Self {
        self.hash_key = Some(hash_key);
        self
    }

    pub(crate) fn map_key(&self) -> HashKey {
        self.hash_key.unwrap_or_else(HashKey::process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_features() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, None);
        assert_eq!(config.allow_comments, cfg!(feature = "comments"));
        assert_eq!(config.hash_key, None);
    }

    #[test]
    fn test_builder_setters() {
        let key = HashKey::from_bytes([5; 16]);
        let config = ParserConfig::new()
            .with_max_depth(4)
            .with_comments(false)
            .with_hash_key(key);
        assert_eq!(config.max_depth, Some(4));
        assert!(!config.allow_comments);
        assert_eq!(config.map_key(), key);
    }
}
