//! Parse cache - memoized expression trees keyed by source text

use crate::config::Limits;
use crate::expression::ast::Expression;
use crate::expression::parser;
use crate::error::Result;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

/// Bounded map from source text to parsed tree
///
/// When full the cache is cleared before the next insert, so memory stays
/// bounded by `capacity` entries.
#[derive(Debug)]
pub struct ParseCache {
    entries: RwLock<AHashMap<String, Arc<Expression>>>,
    capacity: usize,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(4096))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached tree for `text`, building it with `build` on a miss
    ///
    /// Errors from `build` are returned and nothing is cached.
    pub fn get_or_try_insert<F>(&self, text: &str, build: F) -> Result<Arc<Expression>>
    where
        F: FnOnce(&str) -> Result<Expression>,
    {
        // Fast path: read lock only
        if let Some(expression) = self.entries.read().get(text) {
            tracing::trace!(text, "parse cache hit");
            return Ok(Arc::clone(expression));
        }

        tracing::trace!(text, "parse cache miss");
        let expression = Arc::new(build(text)?);

        if self.capacity > 0 {
            let mut entries = self.entries.write();
            if entries.len() >= self.capacity && !entries.contains_key(text) {
                tracing::debug!(capacity = self.capacity, "parse cache full, clearing");
                entries.clear();
            }
            entries.insert(text.to_string(), Arc::clone(&expression));
        }

        Ok(expression)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(Limits::default().max_cache_entries)
    }
}

/// Global cache used by [`get_or_parse`]
static EXPRESSION_CACHE: Lazy<ParseCache> = Lazy::new(ParseCache::default);

/// Get or parse an expression with the default tokens, reusing the tree for
/// repeated text
#[inline]
pub fn get_or_parse(text: &str) -> Arc<Expression> {
    EXPRESSION_CACHE
        .get_or_try_insert(text, |text| Ok(parser::parse(text)))
        .unwrap_or_else(|_| Arc::new(parser::parse(text)))
}

/// Clear the global parse cache
pub fn clear_cache() {
    EXPRESSION_CACHE.clear();
}

/// Number of trees in the global parse cache
pub fn cache_size() -> usize {
    EXPRESSION_CACHE.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_global_cache_hit() {
        let first = get_or_parse("cache_hit_a || cache_hit_b");
        let second = get_or_parse("cache_hit_a || cache_hit_b");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.conditions().len(), 2);
        assert!(cache_size() >= 1);
    }

    #[test]
    fn test_local_cache_bounded() {
        let cache = ParseCache::new(2);
        for text in ["a", "b", "c"] {
            cache
                .get_or_try_insert(text, |t| Ok(parser::parse(t)))
                .unwrap();
        }
        // Clearing happened before the third insert
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ParseCache::new(8);
        let result = cache.get_or_try_insert("a", |_| Err(AnalysisError::EmptyExpression));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let cache = ParseCache::new(0);
        let first = cache.get_or_try_insert("a", |t| Ok(parser::parse(t))).unwrap();
        let second = cache.get_or_try_insert("a", |t| Ok(parser::parse(t))).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ParseCache::new(8);
        cache.get_or_try_insert("a && b", |t| Ok(parser::parse(t))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
