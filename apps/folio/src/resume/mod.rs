//! Resume Renderer: preview and PDF outputs derived from one outline.

pub mod canvas;
pub mod font_metrics;
pub mod outline;
pub mod pdf;
pub mod preview;
pub mod provider;
pub mod service;
pub mod theme;

use thiserror::Error;

use crate::resume::canvas::CanvasError;

pub use provider::{BuiltinPdfLoader, CapabilityLoader, CapabilityProvider};
pub use service::{spawn_initializer, ResumeService};
pub use theme::PdfTheme;

pub const CAPABILITY_FAILURE_MESSAGE: &str =
    "Could not prepare the document generator. Please try again later.";
pub const RENDER_FAILURE_MESSAGE: &str = "Error generating resume. Please try again.";

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("content document is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("document generator unavailable: {0}")]
    Capability(String),

    #[error("drawing failed: {0}")]
    Canvas(#[from] CanvasError),

    #[error("render task failed: {0}")]
    Join(String),
}

impl ResumeError {
    /// The single message shown to the visitor for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResumeError::Capability(_) => CAPABILITY_FAILURE_MESSAGE,
            _ => RENDER_FAILURE_MESSAGE,
        }
    }
}
