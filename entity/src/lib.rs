pub mod prelude;

pub mod platform_tokens;
pub mod platform_users;

/// TikTok's per-application user identifier, the key of every stored profile.
pub type OpenId = String;
