use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::pinyin::render_pinyin;

use super::retry::RetryPolicy;
use super::{
    extractor, groups, sampler, GeneratedSentence, GenerationError, SentenceOracle,
    SentenceRepository, VocabGroup, VocabularyStore, BATCHES_PER_GROUP, BATCH_SIZE,
    GRAMMAR_PARTICLES, SENTENCES_PER_BATCH,
};

/// Drives the full pipeline: vocab-group computation, batch sampling, oracle
/// calls, usage extraction, and transactional persistence, with per-group
/// retry. All lower-level errors are caught and classified only at this
/// retry boundary; nothing below it retries on its own.
pub struct GenerationService<S, O, R> {
    store: S,
    oracle: O,
    repository: R,
    retry: RetryPolicy,
}

impl<S, O, R> GenerationService<S, O, R>
where
    S: VocabularyStore,
    O: SentenceOracle,
    R: SentenceRepository,
{
    pub fn new(store: S, oracle: O, repository: R) -> Self {
        Self::with_retry(store, oracle, repository, RetryPolicy::default())
    }

    pub fn with_retry(store: S, oracle: O, repository: R, retry: RetryPolicy) -> Self {
        Self {
            store,
            oracle,
            repository,
            retry,
        }
    }

    /// One full generation cycle over every current vocab group, processed
    /// sequentially. An empty vocabulary store is a valid no-op cycle. A
    /// group that exhausts its retries aborts the cycle; groups not yet
    /// reached keep their previous cached sentences until the next cycle.
    pub async fn run_all(&self) -> Result<(), GenerationError> {
        let chapters = self.store.list_distinct_chapters().await?;
        let groups = groups::build_groups(&chapters);

        if groups.is_empty() {
            warn!("vocabulary store has no chapters, skipping generation cycle");
            return Ok(());
        }

        info!(groups = groups.len(), "generation cycle started");
        for group in &groups {
            let sentences = self.run_group(group).await?;
            info!(
                vocab_group_id = group.id,
                sentences = sentences.len(),
                chapter_endpoint = group.chapter_endpoint,
                "vocab group refreshed"
            );
        }

        Ok(())
    }

    /// Regenerates one vocab group under the retry policy. Every attempt
    /// re-samples fresh batches rather than replaying the same characters.
    /// Returns the committed sentence set.
    pub async fn run_group(
        &self,
        group: &VocabGroup,
    ) -> Result<Vec<GeneratedSentence>, GenerationError> {
        self.retry
            .run(|attempt| self.attempt_group(group, attempt).boxed())
            .await
            .map_err(|(err, attempts)| GenerationError::RetryExhausted {
                vocab_group_id: group.id,
                attempts,
                source: Box::new(err),
            })
    }

    async fn attempt_group(
        &self,
        group: &VocabGroup,
        attempt: u32,
    ) -> Result<Vec<GeneratedSentence>, GenerationError> {
        let started = Instant::now();
        let mut sentences = Vec::with_capacity(BATCHES_PER_GROUP * SENTENCES_PER_BATCH);

        for batch_index in 0..BATCHES_PER_GROUP {
            let batch = sampler::sample(&self.store, group, BATCH_SIZE).await?;
            let allowed = with_grammar_particles(batch);

            let raw = self
                .oracle
                .generate_sentences(&allowed, SENTENCES_PER_BATCH)
                .await?;

            let extracted = extractor::extract(&raw, &allowed);
            debug!(
                vocab_group_id = group.id,
                batch = batch_index + 1,
                sentences = extracted.len(),
                "batch extracted"
            );

            let now = Utc::now();
            sentences.extend(extracted.into_iter().map(|s| GeneratedSentence {
                id: Uuid::new_v4(),
                vocab_group_id: group.id,
                pinyin: render_pinyin(&s.chinese_text),
                chinese_text: s.chinese_text,
                used_characters: s.used_characters,
                generation_timestamp: now,
            }));
        }

        let persisted = self.repository.replace_group(group.id, &sentences).await?;
        info!(
            vocab_group_id = group.id,
            attempt,
            persisted,
            duration_ms = started.elapsed().as_millis() as u64,
            "vocab group generated"
        );

        Ok(sentences)
    }
}

/// The fixed particle allowlist is unioned into every batch pool; content
/// words that already cover a particle are not duplicated.
fn with_grammar_particles(mut batch: Vec<String>) -> Vec<String> {
    for particle in GRAMMAR_PARTICLES {
        if !batch.iter().any(|token| token == particle) {
            batch.push((*particle).to_string());
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_are_unioned_without_duplicates() {
        let batch = vec!["你".to_string(), "的".to_string(), "学生".to_string()];
        let allowed = with_grammar_particles(batch);

        assert_eq!(
            allowed.iter().filter(|t| t.as_str() == "的").count(),
            1,
            "particle already present in the batch must not repeat"
        );
        for particle in GRAMMAR_PARTICLES {
            assert!(allowed.iter().any(|t| t == particle));
        }
    }
}
