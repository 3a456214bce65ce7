//! Region-type matching
//!
//! Dimensional strata classify a column as spatial by testing
//! candidate identifiers (dimension ids, codelist names, concept
//! names) against a region matcher. The real region provider catalog
//! lives in the mapping layer; here it is a trait seam plus a simple
//! table-driven implementation.

/// Matches candidate identifiers against known region types
pub trait RegionMatcher: Send + Sync {
    /// Canonical region type for a candidate identifier, if any
    fn match_region_type(&self, candidate: &str) -> Option<String>;
}

/// Table-driven matcher over a list of known region types
#[derive(Debug, Clone, Default)]
pub struct RegionProviderList {
    region_types: Vec<String>,
}

impl RegionProviderList {
    /// Create a matcher knowing the given region types
    #[must_use]
    pub fn new(region_types: Vec<String>) -> Self {
        Self { region_types }
    }
}

impl RegionMatcher for RegionProviderList {
    fn match_region_type(&self, candidate: &str) -> Option<String> {
        if candidate.is_empty() {
            return None;
        }
        self.region_types
            .iter()
            .find(|known| known.eq_ignore_ascii_case(candidate))
            .cloned()
    }
}

/// Matcher that knows no region types
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegions;

impl RegionMatcher for NoRegions {
    fn match_region_type(&self, _candidate: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_insensitive_match() {
        let matcher = RegionProviderList::new(vec!["SA4".to_string(), "STE".to_string()]);
        assert_eq!(matcher.match_region_type("sa4"), Some("SA4".to_string()));
        assert_eq!(matcher.match_region_type("LGA"), None);
        assert_eq!(matcher.match_region_type(""), None);
    }
}
