//! Resume Renderer orchestration: notifications, the render gate, and failure
//! reporting around the preview and PDF engines.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::ContentDocument;
use crate::notify::{NotificationCenter, NotificationKind};
use crate::observability::{Failure, FailureSink, FailureStage};
use crate::page::ModalHost;
use crate::resume::outline::ResumeOutline;
use crate::resume::pdf::{pdf_file_name, render_to_pdf};
use crate::resume::preview::{show_preview, PREVIEW_MODAL_ID};
use crate::resume::provider::CapabilityProvider;
use crate::resume::{ResumeError, RENDER_FAILURE_MESSAGE};

pub const GENERATING_MESSAGE: &str = "Generating your resume...";
pub const DOWNLOADED_MESSAGE: &str = "Your new resume has been downloaded!";

#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct ResumeService {
    provider: Arc<CapabilityProvider>,
    notifier: Arc<NotificationCenter>,
    sink: Arc<dyn FailureSink>,
    /// Serializes PDF renders; each render owns its cursor and canvas.
    gate: Mutex<()>,
}

impl ResumeService {
    pub fn new(
        provider: Arc<CapabilityProvider>,
        notifier: Arc<NotificationCenter>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        Self {
            provider,
            notifier,
            sink,
            gate: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<CapabilityProvider> {
        &self.provider
    }

    /// Renders the PDF for `doc`. Failures are recorded once and shown as one
    /// notification; no artifact is returned unless the whole document serialized.
    pub async fn download(&self, doc: Arc<ContentDocument>) -> Result<PdfArtifact, ResumeError> {
        self.notifier.show(NotificationKind::Info, GENERATING_MESSAGE);
        let _gate = self.gate.lock().await;

        match self.render(doc).await {
            Ok(artifact) => {
                info!(
                    file_name = %artifact.file_name,
                    bytes = artifact.bytes.len(),
                    "Resume generated"
                );
                self.notifier
                    .show(NotificationKind::Success, DOWNLOADED_MESSAGE);
                Ok(artifact)
            }
            Err(e) => {
                let stage = match e {
                    ResumeError::Capability(_) => FailureStage::Capability,
                    _ => FailureStage::Render,
                };
                self.report(stage, &e, e.user_message());
                Err(e)
            }
        }
    }

    async fn render(&self, doc: Arc<ContentDocument>) -> Result<PdfArtifact, ResumeError> {
        let factory = self.provider.resolve().await.map_err(|e| match e {
            ResumeError::Capability(_) => e,
            other => ResumeError::Capability(other.to_string()),
        })?;
        let theme = Arc::clone(self.provider.theme());

        tokio::task::spawn_blocking(move || {
            let outline = ResumeOutline::from_document(&doc)?;
            let mut canvas = factory.create(theme.page);
            let bytes = render_to_pdf(&outline, &theme, canvas.as_mut())?;
            Ok(PdfArtifact {
                file_name: pdf_file_name(&outline.header.name),
                bytes: Bytes::from(bytes),
            })
        })
        .await
        .map_err(|e| ResumeError::Join(e.to_string()))?
    }

    /// Shows the preview modal for `doc` on `host`.
    pub fn preview<H: ModalHost + ?Sized>(
        &self,
        host: &mut H,
        doc: &ContentDocument,
    ) -> Result<(), ResumeError> {
        show_preview(host, doc).inspect_err(|e| {
            self.report(FailureStage::Preview, e, RENDER_FAILURE_MESSAGE);
        })?;
        debug!(open = host.overlay_count(PREVIEW_MODAL_ID), "Resume preview mounted");
        Ok(())
    }

    fn report(&self, stage: FailureStage, error: &ResumeError, user_message: &str) {
        warn!(stage = ?stage, error = %error, "Resume rendering failed");
        self.sink.record(&Failure::new(stage, error.to_string()));
        self.notifier.show(NotificationKind::Error, user_message);
    }
}

/// Prepares the document generator whenever a content document is published.
pub fn spawn_initializer(
    mut ready: broadcast::Receiver<Arc<ContentDocument>>,
    service: Arc<ResumeService>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match ready.recv().await {
                Ok(doc) => match service.provider().resolve().await {
                    Ok(_) => info!(name = %doc.personal.name, "Resume generator initialized"),
                    Err(e) => warn!(error = %e, "Resume generator not ready; will retry on demand"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Resume initializer lagged behind content updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::content::ContentStore;
    use crate::observability::testing::RecordingSink;
    use crate::page::target::testing::FakeTarget;
    use crate::resume::canvas::testing::RecordingCanvas;
    use crate::resume::canvas::{Align, CanvasError, CanvasFactory, PdfCanvas};
    use crate::resume::outline::fixtures::{doc, ADA};
    use crate::resume::provider::{BuiltinPdfLoader, CapabilityLoader};
    use crate::resume::theme::{FontSpec, PageSize, PdfTheme, Rgb};
    use crate::resume::CAPABILITY_FAILURE_MESSAGE;

    struct Harness {
        service: Arc<ResumeService>,
        notifier: Arc<NotificationCenter>,
        sink: Arc<RecordingSink>,
    }

    fn harness(loader: Arc<dyn CapabilityLoader>) -> Harness {
        let notifier = Arc::new(NotificationCenter::new());
        let sink = Arc::new(RecordingSink::default());
        let provider = Arc::new(CapabilityProvider::new(
            loader,
            Arc::new(PdfTheme::default()),
        ));
        Harness {
            service: Arc::new(ResumeService::new(provider, notifier.clone(), sink.clone())),
            notifier,
            sink,
        }
    }

    struct UnavailableLoader;

    #[async_trait]
    impl CapabilityLoader for UnavailableLoader {
        async fn load(&self, _theme: &PdfTheme) -> Result<Arc<dyn CanvasFactory>, ResumeError> {
            Err(ResumeError::Capability("script failed to load".to_string()))
        }
    }

    /// Hands out recording canvases; optionally ones that fail to serialize.
    struct FixedLoader(Arc<dyn CanvasFactory>);

    #[async_trait]
    impl CapabilityLoader for FixedLoader {
        async fn load(&self, _theme: &PdfTheme) -> Result<Arc<dyn CanvasFactory>, ResumeError> {
            Ok(Arc::clone(&self.0))
        }
    }

    struct FailingFactory;

    impl CanvasFactory for FailingFactory {
        fn create(&self, page: PageSize) -> Box<dyn PdfCanvas> {
            let mut canvas = RecordingCanvas::new(page);
            canvas.fail_on_finish = true;
            Box::new(canvas)
        }
    }

    /// Tracks how many canvases are being drawn on at once.
    #[derive(Default)]
    struct ConcurrencyGauge {
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    struct GaugeFactory(Arc<ConcurrencyGauge>);

    struct GaugeCanvas {
        inner: RecordingCanvas,
        gauge: Arc<ConcurrencyGauge>,
    }

    impl CanvasFactory for GaugeFactory {
        fn create(&self, page: PageSize) -> Box<dyn PdfCanvas> {
            let now = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.max_active.fetch_max(now, Ordering::SeqCst);
            Box::new(GaugeCanvas {
                inner: RecordingCanvas::new(page),
                gauge: Arc::clone(&self.0),
            })
        }
    }

    impl PdfCanvas for GaugeCanvas {
        fn page_size(&self) -> PageSize {
            self.inner.page_size()
        }
        fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError> {
            self.inner.set_font(font)
        }
        fn current_font(&self) -> Option<&FontSpec> {
            self.inner.current_font()
        }
        fn set_text_color(&mut self, color: Rgb) {
            self.inner.set_text_color(color)
        }
        fn set_draw_color(&mut self, color: Rgb) {
            self.inner.set_draw_color(color)
        }
        fn set_line_width(&mut self, width: f32) {
            self.inner.set_line_width(width)
        }
        fn text(&mut self, text: &str, x: f32, y: f32, align: Align) -> Result<(), CanvasError> {
            self.inner.text(text, x, y, align)
        }
        fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
            self.inner.line(x1, y1, x2, y2)
        }
        fn add_page(&mut self) {
            self.inner.add_page()
        }
        fn page_count(&self) -> usize {
            self.inner.page_count()
        }
        fn finish(&mut self) -> Result<Vec<u8>, CanvasError> {
            std::thread::sleep(Duration::from_millis(20));
            self.gauge.active.fetch_sub(1, Ordering::SeqCst);
            self.inner.finish()
        }
    }

    #[tokio::test]
    async fn test_download_names_file_after_person() {
        let h = harness(Arc::new(BuiltinPdfLoader));
        let artifact = h.service.download(Arc::new(doc(ADA))).await.unwrap();
        assert_eq!(artifact.file_name, "Ada_Lovelace_Resume.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-"));
        let note = h.notifier.current().unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, DOWNLOADED_MESSAGE);
        assert_eq!(h.sink.count(), 0);
    }

    #[tokio::test]
    async fn test_missing_capability_has_distinct_message() {
        let h = harness(Arc::new(UnavailableLoader));
        let err = h.service.download(Arc::new(doc(ADA))).await.unwrap_err();
        assert!(matches!(err, ResumeError::Capability(_)));
        let note = h.notifier.current().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, CAPABILITY_FAILURE_MESSAGE);
        assert_eq!(h.sink.stages(), vec![FailureStage::Capability]);
    }

    #[tokio::test]
    async fn test_render_failure_returns_no_artifact() {
        let h = harness(Arc::new(FixedLoader(Arc::new(FailingFactory))));
        let err = h.service.download(Arc::new(doc(ADA))).await.unwrap_err();
        assert!(matches!(err, ResumeError::Canvas(_)));
        assert_eq!(h.notifier.current().unwrap().message, RENDER_FAILURE_MESSAGE);
        assert_eq!(h.sink.stages(), vec![FailureStage::Render]);
    }

    #[tokio::test]
    async fn test_blank_name_is_render_failure() {
        let h = harness(Arc::new(BuiltinPdfLoader));
        let err = h
            .service
            .download(Arc::new(doc(r#"{"personal":{"name":" "}}"#)))
            .await
            .unwrap_err();
        assert!(matches!(err, ResumeError::MissingField(_)));
        assert_eq!(h.sink.count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_downloads_are_serialized() {
        let gauge = Arc::new(ConcurrencyGauge::default());
        let h = harness(Arc::new(FixedLoader(Arc::new(GaugeFactory(gauge.clone())))));
        let document = Arc::new(doc(ADA));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..4 {
            let service = Arc::clone(&h.service);
            let document = Arc::clone(&document);
            tasks.spawn(async move { service.download(document).await.is_ok() });
        }
        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap());
        }
        assert_eq!(gauge.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preview_failure_is_reported_once() {
        let h = harness(Arc::new(BuiltinPdfLoader));
        let mut host = FakeTarget::default();
        let result = h
            .service
            .preview(&mut host, &doc(r#"{"personal":{"name":""}}"#));
        assert!(result.is_err());
        assert_eq!(host.overlay_count(PREVIEW_MODAL_ID), 0);
        assert_eq!(h.sink.stages(), vec![FailureStage::Preview]);
        assert_eq!(h.notifier.current().unwrap().message, RENDER_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_initializer_prepares_generator_on_ready_signal() {
        let h = harness(Arc::new(BuiltinPdfLoader));
        let store = ContentStore::new();
        let handle = spawn_initializer(store.subscribe(), Arc::clone(&h.service));
        assert!(!h.service.provider().is_ready());

        store.publish(Arc::new(doc(ADA))).await;
        tokio::time::timeout(Duration::from_secs(2), async {
            while !h.service.provider().is_ready() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("generator was not initialized");

        drop(store);
        handle.await.unwrap();
    }
}
