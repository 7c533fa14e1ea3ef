pub mod grid;
pub mod source;

// Re-exports for convenience
pub use grid::{GridLayout, TileDescriptor, TileGrid, TileSetDiff};
pub use source::{OpenStreetMapSource, TileSource, UrlTemplateSource};
