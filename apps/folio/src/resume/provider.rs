//! Capability provider: resolves the PDF drawing backend once.
//!
//! Resolution goes through `OnceCell::get_or_try_init`, so concurrent first
//! callers share a single initialization. A failed initialization leaves the
//! cell empty and the next call tries again.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::resume::canvas::{CanvasFactory, PdfWriterFactory};
use crate::resume::font_metrics::is_supported_family;
use crate::resume::theme::PdfTheme;
use crate::resume::ResumeError;

#[async_trait]
pub trait CapabilityLoader: Send + Sync {
    async fn load(&self, theme: &PdfTheme) -> Result<Arc<dyn CanvasFactory>, ResumeError>;
}

/// Loads the built-in `pdf-writer` backend after checking the theme only asks
/// for fonts it can draw.
pub struct BuiltinPdfLoader;

#[async_trait]
impl CapabilityLoader for BuiltinPdfLoader {
    async fn load(&self, theme: &PdfTheme) -> Result<Arc<dyn CanvasFactory>, ResumeError> {
        if let Some(font) = theme
            .fonts
            .all()
            .into_iter()
            .find(|f| !is_supported_family(&f.family))
        {
            return Err(ResumeError::Capability(format!(
                "font family '{}' is not available",
                font.family
            )));
        }
        Ok(Arc::new(PdfWriterFactory))
    }
}

pub struct CapabilityProvider {
    loader: Arc<dyn CapabilityLoader>,
    theme: Arc<PdfTheme>,
    factory: OnceCell<Arc<dyn CanvasFactory>>,
}

impl CapabilityProvider {
    pub fn new(loader: Arc<dyn CapabilityLoader>, theme: Arc<PdfTheme>) -> Self {
        Self {
            loader,
            theme,
            factory: OnceCell::new(),
        }
    }

    pub fn theme(&self) -> &Arc<PdfTheme> {
        &self.theme
    }

    pub fn is_ready(&self) -> bool {
        self.factory.initialized()
    }

    pub async fn resolve(&self) -> Result<Arc<dyn CanvasFactory>, ResumeError> {
        self.factory
            .get_or_try_init(|| async {
                let factory = self.loader.load(&self.theme).await?;
                info!("Document generator ready");
                Ok::<_, ResumeError>(factory)
            })
            .await
            .map(Arc::clone)
    }
}
