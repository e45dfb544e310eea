//! Render-target capabilities consumed by the projection and preview code.
//!
//! Renderers never touch markup directly; they address named regions and
//! overlays. `HtmlPage` is the production implementation, tests use in-memory fakes.

use crate::content::markup::escape_html;

/// A set of named regions whose contents can be fully replaced.
pub trait RenderTarget {
    fn has_region(&self, name: &str) -> bool;

    /// Replaces the region's contents with `html`. Returns `false` (and changes
    /// nothing) when the region does not exist.
    fn replace_html(&mut self, name: &str, html: String) -> bool;

    /// Escapes `text` and replaces the region's contents with it.
    fn replace_text(&mut self, name: &str, text: &str) -> bool {
        self.replace_html(name, escape_html(text))
    }
}

/// Somewhere overlays (the resume preview modal) can be mounted.
pub trait ModalHost {
    /// Appends an overlay. Does not remove earlier overlays with the same id.
    fn mount_overlay(&mut self, id: &str, html: String);

    /// Removes every overlay with `id`. Returns whether anything was removed.
    fn remove_overlay(&mut self, id: &str) -> bool;

    fn overlay_count(&self, id: &str) -> usize;
}
