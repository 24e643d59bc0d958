//! Service endpoints, header names and retry constants

// Default endpoints
pub const DEFAULT_API_URL: &str = "https://api.box.com/2.0";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.box.com/api/2.0";
pub const DEFAULT_OAUTH_URL: &str = "https://www.box.com/api/oauth2";
pub const DEFAULT_LEGACY_URL: &str = "https://www.box.com/api/1.0";

// Header names and schemes
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const SHARED_LINK_HEADER: &str = "BoxApi";
pub const ON_BEHALF_OF_HEADER: &str = "On-Behalf-Of";
pub const LEGACY_AUTH_SCHEME: &str = "BoxAuth";
pub const BEARER_AUTH_SCHEME: &str = "Bearer";

// Query parameter carrying the field selector
pub const FIELDS_PARAM: &str = "fields";

// Retry: sleep = 2^attempt * RETRY_BASE_DELAY_MS, one retry at most
pub const RETRY_BASE_DELAY_MS: u64 = 100;
pub const MAX_RETRIES: u32 = 1;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
