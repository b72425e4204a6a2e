pub mod chunker;
pub mod indexer;
pub mod prompt;
pub mod retriever;

pub use indexer::{IndexSummary, Indexer};
pub use retriever::Retriever;
