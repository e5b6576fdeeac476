//! # Gatewayエンドポイント

pub mod delete;
pub mod fallback;
pub mod upload;

pub use delete::handle_delete;
pub use fallback::handle_unknown_route;
pub use upload::handle_upload;
