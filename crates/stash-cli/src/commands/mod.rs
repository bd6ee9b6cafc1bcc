pub mod bucket;
pub mod cleanup;
pub mod delete;
pub mod dispatch;
pub mod export;
pub mod store;
