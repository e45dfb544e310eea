// Render targets: the HTML skeleton the content is projected into, and the
// traits the projection and preview code address it through.

pub mod skeleton;
pub mod target;

pub use skeleton::HtmlPage;
pub use target::{ModalHost, RenderTarget};
