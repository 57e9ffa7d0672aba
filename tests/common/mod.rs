#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use liju_backend_rust::generation::{
    GeneratedSentence, GenerationError, SentenceOracle, SentenceRepository, VocabularyStore,
};
use liju_backend_rust::services::llm_provider::OracleError;

/// In-memory vocabulary store.
#[derive(Default)]
pub struct FakeStore {
    pub words: Vec<(i32, String)>,
    pub list_calls: AtomicUsize,
}

impl FakeStore {
    pub fn with_words(words: &[(i32, &str)]) -> Arc<Self> {
        Arc::new(Self {
            words: words
                .iter()
                .map(|(chapter, text)| (*chapter, text.to_string()))
                .collect(),
            list_calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl VocabularyStore for FakeStore {
    async fn list_distinct_chapters(&self) -> Result<Vec<i32>, GenerationError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut chapters: Vec<i32> = self.words.iter().map(|(c, _)| *c).collect();
        chapters.sort_unstable();
        chapters.dedup();
        chapters.reverse();
        Ok(chapters)
    }

    async fn fetch_chapter_range(&self, chapter_end: i32) -> Result<Vec<String>, GenerationError> {
        Ok(self
            .words
            .iter()
            .filter(|(chapter, _)| (1..=chapter_end).contains(chapter))
            .map(|(_, text)| text.clone())
            .collect())
    }
}

/// Scripted oracle: fails its first `fail_first` calls, then answers with
/// `count` tagged sentences drawn from the allowed pool.
#[derive(Default)]
pub struct FakeOracle {
    pub fail_first: usize,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub captured_pools: Mutex<Vec<Vec<String>>>,
}

impl FakeOracle {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_first(fail_first: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            ..Self::default()
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Self::failing_first(usize::MAX)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }
}

#[async_trait]
impl SentenceOracle for FakeOracle {
    async fn generate_sentences(
        &self,
        allowed_characters: &[String],
        count: usize,
    ) -> Result<String, OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured_pools
            .lock()
            .unwrap()
            .push(allowed_characters.to_vec());

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        if call < self.fail_first {
            return Err(OracleError::HttpStatus {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "quota exceeded".to_string(),
            });
        }

        let mut out = String::new();
        for i in 0..count {
            let token = &allowed_characters[i % allowed_characters.len()];
            out.push_str(&format!("SENTENCE_{}: {}。\n", i + 1, token));
        }
        Ok(out)
    }
}

/// In-memory sentence cache; fails its first `fail_first` replace calls.
#[derive(Default)]
pub struct FakeRepository {
    pub fail_first: usize,
    pub replace_calls: AtomicUsize,
    pub saved: Mutex<HashMap<i32, Vec<GeneratedSentence>>>,
}

impl FakeRepository {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_first(fail_first: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            ..Self::default()
        })
    }
}

#[async_trait]
impl SentenceRepository for FakeRepository {
    async fn replace_group(
        &self,
        vocab_group_id: i32,
        sentences: &[GeneratedSentence],
    ) -> Result<u64, GenerationError> {
        let call = self.replace_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(GenerationError::Persistence(sqlx::Error::Protocol(
                "bulk insert failed".to_string(),
            )));
        }

        self.saved
            .lock()
            .unwrap()
            .insert(vocab_group_id, sentences.to_vec());
        Ok(sentences.len() as u64)
    }
}
