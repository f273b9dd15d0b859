pub mod tiktok;
