mod engine;
mod tags;
mod symbol;
mod doc_file;
mod report;
mod sources;
mod resolver;
mod publisher;

// Language-specific front ends
mod languages;

pub use symbol::Symbol;
pub use doc_file::DocFile;
pub use report::TracingReporter;
pub use sources::{collect_sources, FsLoader};
pub use resolver::SymbolResolver;
pub use publisher::{FileView, Publisher};

// Export the main engine
pub use engine::Engine;
