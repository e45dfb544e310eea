use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::content::projection::ProjectionReport;
use crate::content::{ContentLoader, ContentSource, ContentStore, LoadError};
use crate::errors::AppError;
use crate::models::ContentDocument;
use crate::notify::NotificationCenter;
use crate::observability::FailureSink;
use crate::page::HtmlPage;
use crate::resume::{CapabilityLoader, CapabilityProvider, PdfTheme, ResumeService};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The skeleton with the latest projection applied. Preview requests work on a clone.
    pub page: Arc<RwLock<HtmlPage>>,
    pub loader: Arc<ContentLoader>,
    pub resume: Arc<ResumeService>,
    pub notifier: Arc<NotificationCenter>,
}

impl AppState {
    pub fn new(
        config: Config,
        page: HtmlPage,
        source: Arc<dyn ContentSource>,
        capability: Arc<dyn CapabilityLoader>,
        theme: PdfTheme,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        let notifier = Arc::new(NotificationCenter::new());
        let store = Arc::new(ContentStore::new());
        let loader = Arc::new(ContentLoader::new(source, store, Arc::clone(&sink)));
        let provider = Arc::new(CapabilityProvider::new(capability, Arc::new(theme)));
        let resume = Arc::new(ResumeService::new(provider, Arc::clone(&notifier), sink));

        Self {
            config,
            page: Arc::new(RwLock::new(page)),
            loader,
            resume,
            notifier,
        }
    }

    /// Fetches the document and projects it onto a copy of the page, then
    /// swaps the copy in. Readers are never blocked on the network. On failure
    /// the page keeps its current markup.
    pub async fn reload(&self) -> Result<ProjectionReport, LoadError> {
        let mut next = self.page.read().await.clone();
        let (doc, report) = self.loader.load(&mut next).await?;
        *self.page.write().await = next;
        info!(name = %doc.personal.name, applied = report.applied.len(), "Page refreshed");
        Ok(report)
    }

    /// The loaded document, or `ContentUnavailable` before the first successful load.
    pub async fn document(&self) -> Result<Arc<ContentDocument>, AppError> {
        self.loader.store().current().await.ok_or_else(|| {
            AppError::ContentUnavailable("content document has not been loaded".to_string())
        })
    }
}
