//! Page-to-stream-URL resolution pipeline

pub mod api;
pub mod bangumi;
pub mod fetch;
pub mod inline;
pub mod models;
pub mod ordinary;
pub mod select;
pub mod traits;
pub mod urls;

pub use api::ApiEndpoints;
pub use fetch::{PageClient, RetryPolicy};
pub use models::VideoInfo;
pub use traits::{resolve, ExtractContext, Extractor};
pub use urls::PageKind;
