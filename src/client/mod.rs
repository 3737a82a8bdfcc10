pub mod http;
pub mod trait_def;

pub use http::HttpApiClient;
pub use trait_def::{ApiClient, ApiError, ApiResult};
