pub mod blend;
pub mod cache;
pub mod corpus;
pub mod source;

pub use blend::MixOptions;
pub use cache::{LessonCache, LessonCacheKey};
pub use corpus::{CorpusError, CorpusLoader, WordCorpus, WordEntry};
pub use source::{BundledWords, StaticWords, WordSource};
