//! Injected image compression

use async_trait::async_trait;
use std::future::Future;

use crate::errors::CompressionError;

/// Quality used for job image lists
pub const LIST_QUALITY: f32 = 0.6;
/// Quality used for single images (logo, favicon, featured image)
pub const SINGLE_QUALITY: f32 = 0.7;

/// Shrinks a data-URI image. Supplied by the embedding application.
///
/// `quality` is in `0.0..=1.0`. A failure means only that this image is
/// unavailable; callers never abort a batch because of it.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, data_uri: &str, quality: f32) -> Result<String, CompressionError>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCompressor;

#[async_trait]
impl ImageCompressor for PassthroughCompressor {
    async fn compress(&self, data_uri: &str, _quality: f32) -> Result<String, CompressionError> {
        Ok(data_uri.to_string())
    }
}

/// Adapts an async closure into an [`ImageCompressor`].
///
/// ```rust
/// use site_branding_store::errors::CompressionError;
/// use site_branding_store::image_storage::FnCompressor;
///
/// let compressor = FnCompressor::new(|image: String, _quality: f32| async move {
///     Ok::<_, CompressionError>(image)
/// });
/// ```
#[derive(Debug, Clone)]
pub struct FnCompressor<F> {
    f: F,
}

impl<F> FnCompressor<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ImageCompressor for FnCompressor<F>
where
    F: Fn(String, f32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, CompressionError>> + Send + 'static,
{
    async fn compress(&self, data_uri: &str, quality: f32) -> Result<String, CompressionError> {
        (self.f)(data_uri.to_string(), quality).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_returns_input() {
        let out = PassthroughCompressor
            .compress("data:image/png;base64,AAA", LIST_QUALITY)
            .await
            .unwrap();
        assert_eq!(out, "data:image/png;base64,AAA");
    }

    #[tokio::test]
    async fn closure_compressor_sees_quality() {
        let compressor = FnCompressor::new(|image: String, quality: f32| async move {
            if quality > 0.65 {
                Ok(format!("{image}|hi"))
            } else {
                Err(CompressionError::new("low quality rejected"))
            }
        });

        assert_eq!(
            compressor.compress("img", SINGLE_QUALITY).await.unwrap(),
            "img|hi"
        );
        assert!(compressor.compress("img", LIST_QUALITY).await.is_err());
    }
}
