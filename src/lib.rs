// HTTP API
pub mod api;

// Service configuration
pub mod config;

// Google Drive upload client
pub mod drive;

// Error taxonomy
pub mod error;

// OAuth flow coordination
pub mod oauth;

// Upload payload staging
pub mod staging;

// Identity-keyed token persistence
pub mod token_store;
