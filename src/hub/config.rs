//! Hub configuration

/// Default number of recent events retained per topic
pub const DEFAULT_TAIL_BUFFER_SIZE: usize = 200;

/// Default page size for admin listings
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default number of events returned by a tail query
pub const DEFAULT_TAIL_LIMIT: u32 = 20;

/// Maximum page size and tail limit a caller can request
pub const MAX_PAGE_SIZE: u32 = 500;

/// Hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of the per-topic replay ring
    pub tail_buffer_size: usize,

    /// Page size applied when a listing request does not specify one
    pub default_page_size: u32,

    /// Upper bound for requested page sizes
    pub max_page_size: u32,

    /// Tail limit applied when a tail query does not specify one
    pub default_tail_limit: u32,

    /// Upper bound for requested tail limits
    pub max_tail_limit: u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            tail_buffer_size: DEFAULT_TAIL_BUFFER_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            default_tail_limit: DEFAULT_TAIL_LIMIT,
            max_tail_limit: MAX_PAGE_SIZE,
        }
    }
}

impl HubConfig {
    /// Set the per-topic replay ring capacity
    pub fn tail_buffer_size(mut self, size: usize) -> Self {
        self.tail_buffer_size = size;
        self
    }

    /// Set the default page size for listings
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the maximum page size for listings
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Set the default tail query limit
    pub fn default_tail_limit(mut self, limit: u32) -> Self {
        self.default_tail_limit = limit;
        self
    }

    /// Set the maximum tail query limit
    pub fn max_tail_limit(mut self, limit: u32) -> Self {
        self.max_tail_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();

        assert_eq!(config.tail_buffer_size, 200);
        assert_eq!(config.default_page_size, 100);
        assert_eq!(config.max_page_size, 500);
        assert_eq!(config.default_tail_limit, 20);
        assert_eq!(config.max_tail_limit, 500);
    }

    #[test]
    fn test_builder_chaining() {
        let config = HubConfig::default()
            .tail_buffer_size(16)
            .default_page_size(10)
            .max_page_size(50)
            .default_tail_limit(5)
            .max_tail_limit(25);

        assert_eq!(config.tail_buffer_size, 16);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_tail_limit, 5);
        assert_eq!(config.max_tail_limit, 25);
    }
}
