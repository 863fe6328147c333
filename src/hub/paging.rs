//! Lenient query pagination
//!
//! Admin listings and tail queries accept raw query-string values. Parsing
//! never errors: non-numeric or non-positive input falls back to the
//! configured default, and requested sizes are clamped to the configured
//! maximum.

use serde::Serialize;

use super::config::HubConfig;

/// One page of a sorted listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based page number that was applied
    pub page: u32,
    /// Page size that was applied after clamping
    pub page_size: u32,
    /// Total number of records before paging
    pub total: usize,
    /// Records on this page
    pub data: Vec<T>,
}

/// Resolved paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    /// Resolve raw `page` / `pageSize` query values against the config
    pub fn parse(page: Option<&str>, page_size: Option<&str>, config: &HubConfig) -> Self {
        let page = parse_positive(page, 1);
        let page_size =
            parse_positive(page_size, config.default_page_size).min(config.max_page_size);

        Self { page, page_size }
    }
}

/// Parse a positive integer, falling back on any invalid input
pub fn parse_positive(raw: Option<&str>, fallback: u32) -> u32 {
    match raw.and_then(|value| value.trim().parse::<u32>().ok()) {
        Some(value) if value > 0 => value,
        _ => fallback,
    }
}

/// Slice a sorted record list into one page
pub fn paginate<T>(records: Vec<T>, params: PageParams) -> Page<T> {
    let total = records.len();
    let start = (params.page as usize - 1).saturating_mul(params.page_size as usize);

    let data = if start >= total {
        Vec::new()
    } else {
        records
            .into_iter()
            .skip(start)
            .take(params.page_size as usize)
            .collect()
    };

    Page {
        page: params.page,
        page_size: params.page_size,
        total,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_fallbacks() {
        assert_eq!(parse_positive(None, 7), 7);
        assert_eq!(parse_positive(Some(""), 7), 7);
        assert_eq!(parse_positive(Some("abc"), 7), 7);
        assert_eq!(parse_positive(Some("0"), 7), 7);
        assert_eq!(parse_positive(Some("-3"), 7), 7);
        assert_eq!(parse_positive(Some("12"), 7), 12);
        assert_eq!(parse_positive(Some(" 12 "), 7), 12);
    }

    #[test]
    fn test_page_size_clamped_to_max() {
        let config = HubConfig::default();
        let params = PageParams::parse(Some("1"), Some("800"), &config);

        assert_eq!(params.page_size, 500);
    }

    #[test]
    fn test_defaults_applied() {
        let config = HubConfig::default();
        let params = PageParams::parse(None, Some("junk"), &config);

        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 100);
    }

    #[test]
    fn test_paginate_slices_in_order() {
        let params = PageParams {
            page: 1,
            page_size: 2,
        };
        let page = paginate(vec!["a", "b", "c"], params);

        assert_eq!(page.total, 3);
        assert_eq!(page.data, vec!["a", "b"]);
    }

    #[test]
    fn test_paginate_beyond_end_is_empty() {
        let params = PageParams {
            page: 5,
            page_size: 2,
        };
        let page = paginate(vec!["a", "b", "c"], params);

        assert_eq!(page.total, 3);
        assert!(page.data.is_empty());
    }
}
