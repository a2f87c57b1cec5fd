//! Service-wide constants.

/// Client name.
pub const APP_NAME: &str = "microcms";

/// Client version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Domain serving the content API (`https://{service}.microcms.io`).
pub const BASE_DOMAIN: &str = "microcms.io";

/// Domain serving the management API.
pub const BASE_MANAGEMENT_DOMAIN: &str = "microcms-management.io";

/// API version prefixes.
pub const API_VERSION_1: &str = "v1";
pub const API_VERSION_2: &str = "v2";

/// Header carrying the API key on every request (`X-MICROCMS-API-KEY`).
/// Lowercase so it can be used as a static header name.
pub const API_KEY_HEADER: &str = "x-microcms-api-key";

/// Header carrying the client-wide draft key on read requests.
pub const GLOBAL_DRAFT_KEY_HEADER: &str = "x-global-draft-key";

/// Extra attempts after the first one when retry is enabled.
pub const MAX_RETRY_COUNT: u32 = 2;

/// Minimum wait before a retry, in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 5_000;

/// Backoff growth factor between consecutive retries.
pub const RETRY_FACTOR: u32 = 2;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Records requested per page by the pagination drivers.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Page requests dispatched together in one packet by the batch collector.
pub const DEFAULT_REQUESTS_PER_SECOND: usize = 60;

/// Minimum gap between two packets of the batch collector, in milliseconds.
pub const PACKET_INTERVAL_MS: u64 = 1_000;

/// Pause between two pages of the sequential collector, in milliseconds.
pub const PAGE_DELAY_MS: u64 = 1_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_constants() {
        assert_eq!(MAX_RETRY_COUNT + 1, 3);
        assert_eq!(MIN_TIMEOUT_MS, 5_000);
    }
}
