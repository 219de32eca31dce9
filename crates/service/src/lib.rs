//! Service layer for the user directory.
//! - `storage` persists the whole collection as one JSON document.
//! - `user_service` enforces validation, identity and email uniqueness.
//! - `pagination` and `query` shape list requests.

pub mod errors;
pub mod pagination;
pub mod query;
pub mod storage;
pub mod user_service;

pub use user_service::UserService;
