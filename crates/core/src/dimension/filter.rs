//! Dimensional filtering for reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::TagSet;

/// Filter for dimensional queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionFilter {
    /// Keep lines tagged with any of these dimension values.
    pub dimension_values: Vec<Uuid>,
    /// Also keep lines with no dimension tags at all.
    pub include_untagged: bool,
}

impl DimensionFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dimension value to the filter.
    #[must_use]
    pub fn with_value(mut self, value_id: Uuid) -> Self {
        self.dimension_values.push(value_id);
        self
    }

    /// Sets whether to include untagged lines.
    #[must_use]
    pub const fn include_untagged(mut self, include: bool) -> Self {
        self.include_untagged = include;
        self
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimension_values.is_empty() && !self.include_untagged
    }

    /// Returns true if a line with the given tags passes the filter.
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        if self.is_empty() {
            return true;
        }
        if tags.is_empty() {
            return self.include_untagged;
        }
        self.dimension_values
            .iter()
            .any(|v| tags.values().any(|tagged| tagged == v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = DimensionFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&TagSet::new()));

        let tags: TagSet = [(Uuid::new_v4(), Uuid::new_v4())].into_iter().collect();
        assert!(filter.matches(&tags));
    }

    #[test]
    fn test_value_filter() {
        let type_id = Uuid::new_v4();
        let wanted = Uuid::new_v4();
        let other = Uuid::new_v4();
        let filter = DimensionFilter::new().with_value(wanted);

        let tagged: TagSet = [(type_id, wanted)].into_iter().collect();
        let untagged = TagSet::new();
        let wrong: TagSet = [(type_id, other)].into_iter().collect();

        assert!(filter.matches(&tagged));
        assert!(!filter.matches(&untagged));
        assert!(!filter.matches(&wrong));
    }

    #[test]
    fn test_include_untagged() {
        let filter = DimensionFilter::new()
            .with_value(Uuid::new_v4())
            .include_untagged(true);
        assert!(filter.matches(&TagSet::new()));
    }
}
