pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, optional_auth_middleware, require_admin, require_instructor, AuthUser};
pub use response::{ApiResponse, ApiResult};
