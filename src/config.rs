//! Tuning parameters of the ingestion and the analytics passes

use crate::term::CategoryRules;
use crate::utils::unix_now;
use crate::{
    GraphError, GraphResult, DEFAULT_BATCH_SIZE, DEFAULT_HUB_THRESHOLD, DEFAULT_MAX_HOPS,
    DEFAULT_MIN_CO_OCCURRENCE, DEFAULT_PAGE_SIZE,
};

/// Configuration of a [`Pipeline`](`crate::Pipeline`) run
///
/// # Examples
///
/// ```
/// use phenograph::PipelineConfig;
///
/// let config = PipelineConfig::default()
///     .batch_size(500)
///     .min_co_occurrence(3)
///     .timestamp(1_700_000_000);
///
/// assert_eq!(config.get_batch_size(), 500);
/// assert_eq!(config.get_page_size(), 100);
/// assert!(config.validate().is_ok());
///
/// assert!(PipelineConfig::default().page_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    batch_size: usize,
    page_size: usize,
    min_co_occurrence: usize,
    hub_threshold: usize,
    max_hops: usize,
    defer_edges: bool,
    skip_negated: bool,
    timestamp: i64,
    categories: CategoryRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            min_co_occurrence: DEFAULT_MIN_CO_OCCURRENCE,
            hub_threshold: DEFAULT_HUB_THRESHOLD,
            max_hops: DEFAULT_MAX_HOPS,
            defer_edges: false,
            skip_negated: false,
            timestamp: unix_now(),
            categories: CategoryRules::default(),
        }
    }
}

impl PipelineConfig {
    /// Number of records that are committed in one transaction
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Number of anchor phenotypes per association mining page
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Minimum number of shared diseases for an `ASSOCIATED_WITH` edge
    #[must_use]
    pub fn min_co_occurrence(mut self, count: usize) -> Self {
        self.min_co_occurrence = count;
        self
    }

    /// Terms with more `ASSOCIATED_WITH` edges than this are hubs
    #[must_use]
    pub fn hub_threshold(mut self, threshold: usize) -> Self {
        self.hub_threshold = threshold;
        self
    }

    /// Maximum number of hops for the betweenness approximation
    #[must_use]
    pub fn max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    /// Commit `IS_A` edges only after all term nodes
    #[must_use]
    pub fn defer_edges(mut self, defer: bool) -> Self {
        self.defer_edges = defer;
        self
    }

    /// Ignore annotations with the `NOT` qualifier
    #[must_use]
    pub fn skip_negated(mut self, skip: bool) -> Self {
        self.skip_negated = skip;
        self
    }

    /// Unix timestamp written to `created_at` and `modified_at`
    #[must_use]
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Range rules to assign the category of terms
    #[must_use]
    pub fn categories(mut self, categories: CategoryRules) -> Self {
        self.categories = categories;
        self
    }

    /// Number of records that are committed in one transaction
    pub fn get_batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of anchor phenotypes per association mining page
    pub fn get_page_size(&self) -> usize {
        self.page_size
    }

    /// Minimum number of shared diseases for an `ASSOCIATED_WITH` edge
    pub fn get_min_co_occurrence(&self) -> usize {
        self.min_co_occurrence
    }

    /// Terms with more `ASSOCIATED_WITH` edges than this are hubs
    pub fn get_hub_threshold(&self) -> usize {
        self.hub_threshold
    }

    /// Maximum number of hops for the betweenness approximation
    pub fn get_max_hops(&self) -> usize {
        self.max_hops
    }

    /// `true` if `IS_A` edges are committed after all term nodes
    pub fn get_defer_edges(&self) -> bool {
        self.defer_edges
    }

    /// `true` if annotations with the `NOT` qualifier are ignored
    pub fn get_skip_negated(&self) -> bool {
        self.skip_negated
    }

    /// Unix timestamp written to `created_at` and `modified_at`
    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Range rules to assign the category of terms
    pub fn get_categories(&self) -> &CategoryRules {
        &self.categories
    }

    /// Checks that the configuration can be used for a run
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidConfig`] if batch size or page size is `0`
    pub fn validate(&self) -> GraphResult<()> {
        if self.batch_size == 0 {
            return Err(GraphError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(GraphError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.get_batch_size(), 1000);
        assert_eq!(config.get_page_size(), 100);
        assert_eq!(config.get_min_co_occurrence(), 5);
        assert_eq!(config.get_hub_threshold(), 10);
        assert_eq!(config.get_max_hops(), 3);
        assert!(!config.get_defer_edges());
        assert!(!config.get_skip_negated());
        assert!(config.get_timestamp() > 0);
        assert_eq!(config.get_categories().len(), 24);
    }

    #[test]
    fn zero_batch_size() {
        let res = PipelineConfig::default().batch_size(0).validate();
        assert!(matches!(res, Err(GraphError::InvalidConfig(_))));
    }

    #[test]
    fn custom_categories() {
        let rules = CategoryRules::new("Unknown").with_rule(1, 10, "Low");
        let config = PipelineConfig::default().categories(rules);
        assert_eq!(config.get_categories().classify("HP:0000005"), "Low");
        assert_eq!(config.get_categories().classify("HP:0000011"), "Unknown");
    }
}
