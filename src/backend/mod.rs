pub mod auth;
pub mod service;
pub mod store_api;

pub use auth::{AuthError, Authenticator, Session, SessionStorage};
pub use service::BackendService;
pub use store_api::{ApiError, StoreApi, StoreClient};
