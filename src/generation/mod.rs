pub mod extractor;
pub mod groups;
pub mod orchestrator;
pub mod retry;
pub mod sampler;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::services::llm_provider::OracleError;

pub const BATCH_SIZE: usize = 300;
pub const BATCHES_PER_GROUP: usize = 4;
pub const SENTENCES_PER_BATCH: usize = 30;
pub const MAX_VOCAB_GROUPS: usize = 5;

/// Function words unioned into every batch pool, so the oracle always has
/// grammatical glue available no matter which content words were sampled.
pub const GRAMMAR_PARTICLES: &[&str] = &[
    "的", "了", "是", "在", "我", "你", "他", "她", "们", "不",
    "很", "和", "有", "这", "那", "吗", "呢", "吧", "也", "都",
];

/// A cumulative vocabulary window: all vocabulary from chapter 1 through
/// `chapter_endpoint`. Recomputed from the live chapter distribution on every
/// generation cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabGroup {
    pub id: i32,
    pub chapter_start: i32,
    pub chapter_endpoint: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSentence {
    pub id: Uuid,
    pub vocab_group_id: i32,
    pub chinese_text: String,
    pub pinyin: String,
    pub used_characters: Vec<String>,
    pub generation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no vocabulary found for chapters 1..={chapter_end}")]
    NoVocabulary { chapter_end: i32 },
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),
    #[error("persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error(
        "failed to generate sentences for vocab group {vocab_group_id} \
         after {attempts} attempts. Last error: {source}"
    )]
    RetryExhausted {
        vocab_group_id: i32,
        attempts: u32,
        source: Box<GenerationError>,
    },
}

/// Read side of the (externally owned) vocabulary store.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Distinct chapter numbers present in the store, descending.
    async fn list_distinct_chapters(&self) -> Result<Vec<i32>, GenerationError>;

    /// Every vocabulary token whose chapter lies in `[1, chapter_end]`.
    async fn fetch_chapter_range(&self, chapter_end: i32) -> Result<Vec<String>, GenerationError>;
}

/// The external text-generation oracle. Returns free-form text; there is no
/// guarantee the output respects `allowed_characters`.
#[async_trait]
pub trait SentenceOracle: Send + Sync {
    async fn generate_sentences(
        &self,
        allowed_characters: &[String],
        count: usize,
    ) -> Result<String, OracleError>;
}

/// Write side of the sentence cache. `replace_group` is all-or-nothing.
#[async_trait]
pub trait SentenceRepository: Send + Sync {
    async fn replace_group(
        &self,
        vocab_group_id: i32,
        sentences: &[GeneratedSentence],
    ) -> Result<u64, GenerationError>;
}

#[async_trait]
impl<T: VocabularyStore + ?Sized> VocabularyStore for std::sync::Arc<T> {
    async fn list_distinct_chapters(&self) -> Result<Vec<i32>, GenerationError> {
        (**self).list_distinct_chapters().await
    }

    async fn fetch_chapter_range(&self, chapter_end: i32) -> Result<Vec<String>, GenerationError> {
        (**self).fetch_chapter_range(chapter_end).await
    }
}

#[async_trait]
impl<T: SentenceOracle + ?Sized> SentenceOracle for std::sync::Arc<T> {
    async fn generate_sentences(
        &self,
        allowed_characters: &[String],
        count: usize,
    ) -> Result<String, OracleError> {
        (**self).generate_sentences(allowed_characters, count).await
    }
}

#[async_trait]
impl<T: SentenceRepository + ?Sized> SentenceRepository for std::sync::Arc<T> {
    async fn replace_group(
        &self,
        vocab_group_id: i32,
        sentences: &[GeneratedSentence],
    ) -> Result<u64, GenerationError> {
        (**self).replace_group(vocab_group_id, sentences).await
    }
}
