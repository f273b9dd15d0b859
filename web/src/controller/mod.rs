pub(crate) mod auth_controller;
pub(crate) mod config_controller;
pub(crate) mod fallback_controller;
pub(crate) mod health_check_controller;
pub(crate) mod platform_user_controller;
pub(crate) mod tiktok_controller;
