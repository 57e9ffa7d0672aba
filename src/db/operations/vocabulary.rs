use async_trait::async_trait;

use crate::db::Database;
use crate::generation::{GenerationError, VocabularyStore};

#[async_trait]
impl VocabularyStore for Database {
    async fn list_distinct_chapters(&self) -> Result<Vec<i32>, GenerationError> {
        let chapters = sqlx::query_scalar(
            r#"SELECT DISTINCT "chapter" FROM "words" ORDER BY "chapter" DESC"#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(chapters)
    }

    async fn fetch_chapter_range(&self, chapter_end: i32) -> Result<Vec<String>, GenerationError> {
        let tokens = sqlx::query_scalar(
            r#"SELECT "text" FROM "words" WHERE "chapter" BETWEEN 1 AND $1"#,
        )
        .bind(chapter_end)
        .fetch_all(self.pool())
        .await?;

        Ok(tokens)
    }
}
