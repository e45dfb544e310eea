//! Static export: the projected page, the page with the resume preview open,
//! the resume PDF, and a copy of the assets directory.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::content::markup::PREVIEW_ROUTE;
use crate::resume::preview::{close_preview, DOWNLOAD_ROUTE};
use crate::state::AppState;

pub const INDEX_FILE: &str = "index.html";
pub const PREVIEW_FILE: &str = "resume.html";

const ASSETS_ROUTE: &str = "/assets/";
const LINK_ATTRS: [&str; 2] = ["href", "src"];

/// Loads the content document and writes every output into `out`.
/// Returns the paths written, in order.
pub async fn export_site(state: &AppState, out: &Path) -> Result<Vec<PathBuf>> {
    state
        .reload()
        .await
        .context("Content document could not be loaded")?;
    let doc = state.document().await?;

    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    let mut page = state.page.read().await.clone();
    state.resume.preview(&mut page, &doc)?;
    let preview_html = page.render();
    close_preview(&mut page);
    let index_html = page.render();
    let artifact = state.resume.download(doc).await?;

    let routes = static_routes(&artifact.file_name);
    let mut written = Vec::new();
    written.push(write(out.join(INDEX_FILE), relink(&index_html, &routes).into_bytes()).await?);
    written.push(write(out.join(PREVIEW_FILE), relink(&preview_html, &routes).into_bytes()).await?);
    written.push(write(out.join(&artifact.file_name), artifact.bytes.to_vec()).await?);

    let assets = state.config.assets_dir();
    if assets.is_dir() {
        let target = out.join("assets");
        let copied = tokio::task::spawn_blocking(move || copy_dir(&assets, &target))
            .await
            .map_err(|e| anyhow!("spawn_blocking failed while copying assets: {e}"))??;
        written.extend(copied);
    }

    info!(files = written.len(), out = %out.display(), "Site exported");
    Ok(written)
}

/// Server routes and the exported files that replace them.
fn static_routes(pdf_file: &str) -> Vec<(&'static str, String)> {
    vec![
        ("/", INDEX_FILE.to_string()),
        (PREVIEW_ROUTE, PREVIEW_FILE.to_string()),
        (DOWNLOAD_ROUTE, pdf_file.to_string()),
    ]
}

/// Points links at exported files instead of server routes.
fn relink(html: &str, routes: &[(&'static str, String)]) -> String {
    let mut html = html.to_string();
    for attr in LINK_ATTRS {
        for (route, file) in routes {
            html = html.replace(&format!("{attr}=\"{route}\""), &format!("{attr}=\"{file}\""));
        }
        html = html.replace(
            &format!("{attr}=\"{ASSETS_ROUTE}"),
            &format!("{attr}=\"{}", ASSETS_ROUTE.trim_start_matches('/')),
        );
    }
    html
}

async fn write(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf> {
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn copy_dir(from: &Path, to: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(to).with_context(|| format!("Failed to create {}", to.display()))?;
    let mut copied = Vec::new();
    for entry in std::fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))? {
        let entry = entry?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copied.extend(copy_dir(&source, &target)?);
        } else {
            std::fs::copy(&source, &target)
                .with_context(|| format!("Failed to copy {}", source.display()))?;
            copied.push(target);
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::Config;
    use crate::content::source::FileSource;
    use crate::observability::testing::RecordingSink;
    use crate::page::HtmlPage;
    use crate::resume::outline::fixtures::ADA;
    use crate::resume::preview::PREVIEW_MODAL_ID;
    use crate::resume::{BuiltinPdfLoader, PdfTheme};

    const SKELETON: &str = "<html><head><title><!-- region:page.title -->Portfolio<!-- /region --></title></head><body></body></html>";

    fn state_for(site: &Path, content: &Path) -> AppState {
        state_with_skeleton(site, content, SKELETON)
    }

    fn state_with_skeleton(site: &Path, content: &Path, skeleton: &str) -> AppState {
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            site_dir: site.to_path_buf(),
            content_source: content.display().to_string(),
            theme_path: None,
            fetch_timeout: Duration::from_secs(1),
        };
        AppState::new(
            config,
            HtmlPage::parse(skeleton).unwrap(),
            Arc::new(FileSource::new(content)),
            Arc::new(BuiltinPdfLoader),
            PdfTheme::default(),
            Arc::new(RecordingSink::default()),
        )
    }

    #[tokio::test]
    async fn test_export_writes_page_preview_pdf_and_assets() {
        let site = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(site.path().join("assets/css")).unwrap();
        std::fs::write(site.path().join("assets/css/site.css"), "body{}").unwrap();
        let content = site.path().join("content.json");
        std::fs::write(&content, ADA).unwrap();
        let out = tempfile::tempdir().unwrap();

        let state = state_for(site.path(), &content);
        let written = export_site(&state, out.path()).await.unwrap();

        assert_eq!(written.len(), 4);
        let index = std::fs::read_to_string(out.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("Ada Lovelace | Portfolio"));
        assert!(!index.contains(PREVIEW_MODAL_ID));
        let preview = std::fs::read_to_string(out.path().join(PREVIEW_FILE)).unwrap();
        assert!(preview.contains(PREVIEW_MODAL_ID));
        let pdf = std::fs::read(out.path().join("Ada_Lovelace_Resume.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(out.path().join("assets/css/site.css").is_file());
    }

    #[tokio::test]
    async fn test_exported_links_resolve_to_written_files() {
        let site = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(site.path().join("assets/css")).unwrap();
        std::fs::create_dir_all(site.path().join("assets/js")).unwrap();
        std::fs::write(site.path().join("assets/css/site.css"), "body{}").unwrap();
        std::fs::write(site.path().join("assets/js/site.js"), "").unwrap();
        let content = site.path().join("content.json");
        std::fs::write(
            &content,
            r#"{"personal":{"name":"Ada Lovelace","resumePath":"/resume/download"},
                "footer":{"links":[{"url":"/","text":"Home"},{"url":"https://example.com","text":"Out"}]},
                "resume":{"experience":[],"education":[]}}"#,
        )
        .unwrap();
        let out = tempfile::tempdir().unwrap();

        let skeleton = include_str!("../site/index.html");
        let state = state_with_skeleton(site.path(), &content, skeleton);
        export_site(&state, out.path()).await.unwrap();

        let link_re = regex::Regex::new(r#"\s(?:href|src)="([^"]*)""#).unwrap();
        for page in [INDEX_FILE, PREVIEW_FILE] {
            let html = std::fs::read_to_string(out.path().join(page)).unwrap();
            let links: Vec<&str> = link_re
                .captures_iter(&html)
                .map(|c| c.get(1).unwrap().as_str())
                .filter(|l| !l.starts_with("http") && !l.starts_with('#') && !l.starts_with("mailto:"))
                .collect();
            assert!(links.contains(&PREVIEW_FILE), "{page} has no preview link");
            for link in links {
                assert!(!link.starts_with('/'), "{page} links to server route {link}");
                assert!(out.path().join(link).is_file(), "{page} links to missing {link}");
            }
        }
        let preview = std::fs::read_to_string(out.path().join(PREVIEW_FILE)).unwrap();
        assert!(preview.contains("href=\"Ada_Lovelace_Resume.pdf\""));
    }

    #[test]
    fn test_relink_only_touches_exact_routes() {
        let routes = static_routes("A_Resume.pdf");
        let html = r#"<a href="/">h</a><a href="/resume">p</a><a href="/resume/download">d</a><a href="/resume/x">x</a><script src="/assets/js/site.js"></script>"#;
        assert_eq!(
            relink(html, &routes),
            r#"<a href="index.html">h</a><a href="resume.html">p</a><a href="A_Resume.pdf">d</a><a href="/resume/x">x</a><script src="assets/js/site.js"></script>"#
        );
    }

    #[tokio::test]
    async fn test_export_fails_without_content() {
        let site = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let state = state_for(site.path(), &site.path().join("missing.json"));
        assert!(export_site(&state, out.path()).await.is_err());
        assert!(!out.path().join(INDEX_FILE).exists());
    }
}
