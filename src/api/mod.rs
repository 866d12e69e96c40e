pub mod cached;
pub mod client;
pub mod error;
pub mod hr;
pub mod transport;
pub mod types;

pub use cached::CachedHrApi;
pub use client::HttpClient;
pub use error::ApiError;
pub use hr::HrApi;
