// Content Loader: sources, the shared document store, and the projection of
// the document onto the page skeleton.

pub mod loader;
pub mod markup;
pub mod projection;
pub mod source;
pub mod store;

pub use loader::ContentLoader;
pub use source::{source_from_location, ContentSource, LoadError};
pub use store::ContentStore;
