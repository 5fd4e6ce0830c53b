pub mod enrichment;
pub mod extractor;
pub mod fetcher;
pub mod gemini;
pub mod processor;

pub use enrichment::Enricher;
pub use fetcher::{ContentFetcher, FetchedPage, HttpFetcher};
pub use gemini::{GeminiClient, TextGenerator};
pub use processor::ArticleProcessor;
