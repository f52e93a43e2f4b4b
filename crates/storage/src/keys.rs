//! Well-known storage keys shared by every flow.

/// Bearer credential returned by the auth endpoint.
pub const USER_TOKEN: &str = "userToken";

/// Cached profile of the signed-in enumerator (JSON object).
pub const USER_PROFILE: &str = "userData";

/// Legacy profile slot written by older app builds; cleared on logout.
pub const LEGACY_USER: &str = "user";

/// Last successfully computed dashboard summary (JSON).
pub const DASHBOARD_SUMMARY: &str = "dashboardSummary";

/// Keys that make up the authenticated session itself.
pub const SESSION_KEYS: [&str; 3] = [USER_TOKEN, USER_PROFILE, LEGACY_USER];
