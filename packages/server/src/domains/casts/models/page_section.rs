use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{require_text, ValidationError};
use crate::common::{CastId, PageSectionId};

/// Extra content block on a cast's home page, shown in `sort_order`
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct PageSection {
    pub id: PageSectionId,
    pub cast_id: CastId,
    pub title: String,
    pub text: String,
    pub sort_order: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub title: String,
    pub text: String,
    #[serde(default = "default_order")]
    pub sort_order: i16,
}

fn default_order() -> i16 {
    1
}

impl SectionInput {
    pub fn clean(self) -> Result<Self, ValidationError> {
        let input = Self {
            title: self.title.trim().to_string(),
            text: self.text.trim().to_string(),
            sort_order: self.sort_order,
        };
        require_text("title", &input.title, 128)?;
        require_text("text", &input.text, usize::MAX)?;
        if input.sort_order < 0 {
            return Err(ValidationError::new("sort_order", "Order must be zero or greater"));
        }
        Ok(input)
    }
}

impl PageSection {
    pub async fn find_for_cast(cast_id: CastId, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM page_sections WHERE cast_id = $1 ORDER BY sort_order, created_at",
        )
        .bind(cast_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(cast_id: CastId, input: &SectionInput, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO page_sections (id, cast_id, title, text, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(PageSectionId::new())
        .bind(cast_id)
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.sort_order)
        .fetch_one(pool)
        .await
    }

    /// Update a section, scoped to the cast that owns it.
    ///
    /// Returns `None` when the section does not belong to `cast_id`.
    pub async fn update(
        id: PageSectionId,
        cast_id: CastId,
        input: &SectionInput,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE page_sections
             SET title = $3, text = $4, sort_order = $5
             WHERE id = $1 AND cast_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(cast_id)
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.sort_order)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(id: PageSectionId, cast_id: CastId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM page_sections WHERE id = $1 AND cast_id = $2")
            .bind(id)
            .bind(cast_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_requires_title_and_text() {
        let missing_title = SectionInput {
            title: " ".to_string(),
            text: "Bring rice".to_string(),
            sort_order: 1,
        };
        assert_eq!(missing_title.clean().unwrap_err().field, "title");

        let missing_text = SectionInput {
            title: "Audience etiquette".to_string(),
            text: String::new(),
            sort_order: 1,
        };
        assert_eq!(missing_text.clean().unwrap_err().field, "text");
    }

    #[test]
    fn test_clean_rejects_negative_order() {
        let input = SectionInput {
            title: "Props".to_string(),
            text: "No open flames".to_string(),
            sort_order: -1,
        };
        assert_eq!(input.clean().unwrap_err().field, "sort_order");
    }
}
