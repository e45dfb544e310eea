pub mod content;

pub use content::ContentDocument;
