pub use super::platform_tokens::Entity as PlatformTokens;
pub use super::platform_users::Entity as PlatformUsers;
