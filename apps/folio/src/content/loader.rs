//! Content Loader: fetch the document once, project it, announce it.
//!
//! A failed fetch or parse leaves the render target exactly as it was (the
//! skeleton's fallback markup stays), is recorded on the failure sink once, and
//! is returned to the caller; it never surfaces to the visitor.

use std::sync::Arc;

use tracing::{info, warn};

use crate::content::projection::{project, ProjectionReport};
use crate::content::source::{ContentSource, LoadError};
use crate::content::store::ContentStore;
use crate::models::ContentDocument;
use crate::observability::{Failure, FailureSink, FailureStage};
use crate::page::RenderTarget;

pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    store: Arc<ContentStore>,
    sink: Arc<dyn FailureSink>,
}

impl ContentLoader {
    pub fn new(
        source: Arc<dyn ContentSource>,
        store: Arc<ContentStore>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        Self {
            source,
            store,
            sink,
        }
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    /// Fetches and parses the document without touching any render target.
    pub async fn fetch(&self) -> Result<ContentDocument, LoadError> {
        let parsed = match self.source.fetch().await {
            Ok(bytes) => serde_json::from_slice::<ContentDocument>(&bytes).map_err(LoadError::from),
            Err(e) => Err(e),
        };

        parsed.map_err(|e| {
            let stage = match &e {
                LoadError::Malformed(_) => FailureStage::Parse,
                _ => FailureStage::Fetch,
            };
            warn!(
                location = %self.source.location(),
                error = %e,
                "Content document unavailable; keeping fallback markup"
            );
            self.sink.record(&Failure::new(stage, e.to_string()));
            e
        })
    }

    /// Projects `doc` onto `target`, stores it, and emits the ready signal once.
    pub async fn apply<T: RenderTarget + ?Sized>(
        &self,
        doc: ContentDocument,
        target: &mut T,
    ) -> (Arc<ContentDocument>, ProjectionReport) {
        let report = project(&doc, target);
        let doc = Arc::new(doc);
        let listeners = self.store.publish(Arc::clone(&doc)).await;
        info!(
            name = %doc.personal.name,
            regions = report.applied.len(),
            listeners,
            "Content loaded"
        );
        (doc, report)
    }

    /// `fetch` then `apply`. On failure `target` is left untouched.
    pub async fn load<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
    ) -> Result<(Arc<ContentDocument>, ProjectionReport), LoadError> {
        let doc = self.fetch().await?;
        Ok(self.apply(doc, target).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;

    use crate::content::projection::BINDINGS;
    use crate::observability::testing::RecordingSink;
    use crate::page::target::testing::FakeTarget;

    const ADA: &str = r#"{
        "personal":{"name":"Ada Lovelace"},
        "hero":{"byline":{"label":"L","date":"D"},"meta":[],"lede":"x"},
        "about":{"eyebrow":"","title":"","intro":"","paragraphs":[],"quote":"","skills":[]},
        "projects":{"eyebrow":"","title":"","description":"","items":[]},
        "contact":{"eyebrow":"","title":"","intro":"","methods":[],"formTitle":""},
        "footer":{"copyright":"2024","links":[]}
    }"#;

    struct StaticSource(&'static str);

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
            Ok(self.0.as_bytes().to_vec())
        }
        fn location(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ContentSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
            Err(LoadError::Status(503))
        }
        fn location(&self) -> String {
            "failing".to_string()
        }
    }

    fn target() -> FakeTarget {
        let names: Vec<&str> = BINDINGS.iter().map(|b| b.region).collect();
        FakeTarget::with_regions(&names)
    }

    fn loader(source: Arc<dyn ContentSource>) -> (ContentLoader, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let loader = ContentLoader::new(source, Arc::new(ContentStore::new()), sink.clone());
        (loader, sink)
    }

    #[tokio::test]
    async fn test_load_projects_and_signals_once() {
        let (loader, sink) = loader(Arc::new(StaticSource(ADA)));
        let mut ready = loader.store().subscribe();
        let mut page = target();

        let (doc, _) = loader.load(&mut page).await.unwrap();

        assert_eq!(doc.personal.name, "Ada Lovelace");
        assert_eq!(page.get("page.title"), Some("Ada Lovelace | Portfolio"));
        assert_eq!(page.get("footer.copyright"), Some("© 2024"));
        assert_eq!(ready.recv().await.unwrap().personal.name, "Ada Lovelace");
        assert!(matches!(ready.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn test_loading_twice_is_identical() {
        let (loader, _) = loader(Arc::new(StaticSource(ADA)));
        let mut page = target();
        loader.load(&mut page).await.unwrap();
        let first = page.clone();
        loader.load(&mut page).await.unwrap();
        assert_eq!(first, page);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_target_untouched() {
        let (loader, sink) = loader(Arc::new(FailingSource));
        let mut ready = loader.store().subscribe();
        let mut page = target();
        let before = page.clone();

        let result = loader.load(&mut page).await;

        assert!(matches!(result, Err(LoadError::Status(503))));
        assert_eq!(page, before);
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.stages(), vec![FailureStage::Fetch]);
        assert!(matches!(ready.try_recv(), Err(TryRecvError::Empty)));
        assert!(loader.store().current().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_is_parse_failure() {
        let (loader, sink) = loader(Arc::new(StaticSource(r#"{"personal":{}}"#)));
        let mut page = target();
        let before = page.clone();

        let result = loader.load(&mut page).await;

        assert!(matches!(result, Err(LoadError::Malformed(_))));
        assert_eq!(page, before);
        assert_eq!(sink.stages(), vec![FailureStage::Parse]);
    }
}
