pub use entity::{platform_tokens, platform_users, OpenId};

pub mod error;
pub mod platform_user;
