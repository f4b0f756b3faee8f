//! Shared Types
//!
//! Query parameter types used across the application

use serde::Deserialize;

/// Default listing page size
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Price sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Asc,
    Desc,
}

/// Product listing filter / pagination query parameters
///
/// Every filter is independently optional and they compose with AND
/// semantics; no combination is an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    pub category_id: Option<i64>,
    pub sort_price: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl ProductFilters {
    /// Current page (1-based)
    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size for SQL queries
    pub fn limit(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1)
    }

    /// Offset for SQL queries
    pub fn offset(&self) -> i64 {
        (self.current_page() as i64 - 1) * self.limit() as i64
    }

    /// Requested price ordering.
    ///
    /// `None` when no sort was submitted; `desc` (any case) sorts
    /// descending, any other submitted value falls back to ascending.
    pub fn price_sort(&self) -> Option<PriceSort> {
        self.sort_price.as_deref().map(|s| {
            if s.eq_ignore_ascii_case("desc") {
                PriceSort::Desc
            } else {
                PriceSort::Asc
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing_falls_back_to_ascending() {
        let mut filters = ProductFilters::default();
        assert_eq!(filters.price_sort(), None);

        filters.sort_price = Some("desc".to_string());
        assert_eq!(filters.price_sort(), Some(PriceSort::Desc));

        filters.sort_price = Some("DeSc".to_string());
        assert_eq!(filters.price_sort(), Some(PriceSort::Desc));

        filters.sort_price = Some("upwards".to_string());
        assert_eq!(filters.price_sort(), Some(PriceSort::Asc));
    }

    #[test]
    fn paging_defaults() {
        let filters = ProductFilters::default();
        assert_eq!(filters.current_page(), 1);
        assert_eq!(filters.limit(), 15);
        assert_eq!(filters.offset(), 0);

        let filters = ProductFilters {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(filters.offset(), 20);
    }
}
