use rand::Rng;

use super::{GenerationError, VocabGroup, VocabularyStore};

/// Draws one batch of `batch_size` vocabulary items for the group's chapter
/// window. Each call fetches and samples independently, so consecutive
/// batches exercise fresh randomness.
pub async fn sample<S: VocabularyStore>(
    store: &S,
    group: &VocabGroup,
    batch_size: usize,
) -> Result<Vec<String>, GenerationError> {
    let pool = store.fetch_chapter_range(group.chapter_endpoint).await?;
    if pool.is_empty() {
        return Err(GenerationError::NoVocabulary {
            chapter_end: group.chapter_endpoint,
        });
    }

    let mut rng = rand::rng();
    Ok(draw_batch(&pool, batch_size, &mut rng))
}

/// Uniform sample of exactly `batch_size` items. A pool smaller than the
/// batch is sampled with replacement until the batch is full; otherwise the
/// sample is without replacement, in no guaranteed order.
pub fn draw_batch<R: Rng>(pool: &[String], batch_size: usize, rng: &mut R) -> Vec<String> {
    if pool.len() < batch_size {
        return (0..batch_size)
            .map(|_| pool[rng.random_range(0..pool.len())].clone())
            .collect();
    }

    rand::seq::index::sample(rng, pool.len(), batch_size)
        .into_iter()
        .map(|idx| pool[idx].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("词{i}")).collect()
    }

    #[test]
    fn small_pool_fills_batch_with_replacement() {
        let pool = pool_of(7);
        let mut rng = rand::rng();

        let batch = draw_batch(&pool, 300, &mut rng);

        assert_eq!(batch.len(), 300);
        assert!(batch.iter().all(|item| pool.contains(item)));
    }

    #[test]
    fn large_pool_samples_without_repeats() {
        let pool = pool_of(500);
        let mut rng = rand::rng();

        let batch = draw_batch(&pool, 300, &mut rng);

        assert_eq!(batch.len(), 300);
        let mut unique: Vec<&String> = batch.iter().collect();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 300);
    }

    #[test]
    fn exact_size_pool_returns_every_item() {
        let pool = pool_of(300);
        let mut rng = rand::rng();

        let mut batch = draw_batch(&pool, 300, &mut rng);
        batch.sort();
        let mut expected = pool.clone();
        expected.sort();

        assert_eq!(batch, expected);
    }
}
