pub mod auth;
pub mod response;

pub use auth::{identity_middleware, IdentityResolver, RequestContext, TokenInfo};
pub use response::{ApiResponse, ApiResult};
