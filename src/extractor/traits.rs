use async_trait::async_trait;
use tracing::debug;

use crate::extractor::api::ApiEndpoints;
use crate::extractor::bangumi::BangumiExtractor;
use crate::extractor::fetch::PageClient;
use crate::extractor::models::VideoInfo;
use crate::extractor::ordinary::OrdinaryExtractor;
use crate::extractor::urls::PageKind;
use crate::utils::error::BiliDlError;

/// Everything an extractor needs to resolve one page
pub struct ExtractContext<'a> {
    pub client: &'a PageClient,
    pub api: &'a ApiEndpoints,
    /// Page URL with the query string already stripped
    pub url: &'a str,
    pub kind: PageKind,
    /// Fetched page body
    pub html: &'a str,
}

/// Core trait for page extractors
///
/// Isolates the pipeline from the page family being resolved (ordinary
/// video vs. bangumi); routing picks the first extractor that claims the
/// classified page kind.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Unique identifier for this extractor
    fn id(&self) -> &'static str;

    /// Whether this extractor handles the given page kind
    fn supports(&self, kind: &PageKind) -> bool;

    /// Resolve the page into downloadable stream URLs
    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<VideoInfo, BiliDlError>;
}

/// Route a classified page to its extractor.
pub async fn resolve(ctx: &ExtractContext<'_>) -> Result<VideoInfo, BiliDlError> {
    let extractors: [&dyn Extractor; 2] = [&BangumiExtractor, &OrdinaryExtractor];
    for extractor in extractors {
        if extractor.supports(&ctx.kind) {
            debug!("routing {} to {}", ctx.url, extractor.id());
            return extractor.extract(ctx).await;
        }
    }
    Err(BiliDlError::ExtractionError(format!(
        "no extractor handles {:?}",
        ctx.kind
    )))
}
