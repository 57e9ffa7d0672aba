use async_trait::async_trait;

use crate::db::Database;
use crate::generation::{GeneratedSentence, GenerationError, SentenceRepository};

#[async_trait]
impl SentenceRepository for Database {
    /// Deletes every cached row for the group and bulk-inserts the new set in
    /// one transaction. On any failure the transaction is dropped uncommitted
    /// and sqlx rolls it back, so readers never observe a half-replaced
    /// group. An empty sentence set is a legal zero-row insert.
    async fn replace_group(
        &self,
        vocab_group_id: i32,
        sentences: &[GeneratedSentence],
    ) -> Result<u64, GenerationError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(r#"DELETE FROM "generated_sentences" WHERE "vocabGroupId" = $1"#)
            .bind(vocab_group_id)
            .execute(&mut *tx)
            .await?;

        let mut persisted = 0u64;
        for sentence in sentences {
            let used = serde_json::to_value(&sentence.used_characters)
                .unwrap_or_else(|_| serde_json::Value::Array(Vec::new()));

            let result = sqlx::query(
                r#"
                INSERT INTO "generated_sentences"
                    ("id", "vocabGroupId", "chineseText", "pinyin", "usedCharacters", "generationTimestamp")
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sentence.id)
            .bind(sentence.vocab_group_id)
            .bind(&sentence.chinese_text)
            .bind(&sentence.pinyin)
            .bind(&used)
            .bind(sentence.generation_timestamp)
            .execute(&mut *tx)
            .await?;

            persisted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(persisted)
    }
}
