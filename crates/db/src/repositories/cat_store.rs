//! Repository for the `cats` table, behind a store trait so handlers take
//! the backend by constructor injection (Postgres in production, memory in
//! tests and local development).

use std::collections::HashMap;

use async_trait::async_trait;
use chassis_core::types::DocId;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::cat::{Cat, CreateCat, UpdateCat};
use crate::DbPool;

/// Default page size for listing.
pub const DEFAULT_LIMIT: i64 = 20;

/// Maximum page size for listing.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested limit into `1..=MAX_LIMIT`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative, defaulting to zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// CRUD operations over the cats collection.
#[async_trait]
pub trait CatStore: Send + Sync {
    async fn create(&self, input: &CreateCat) -> Result<Cat, sqlx::Error>;

    /// List cats ordered by creation time. Callers clamp `limit`/`offset`
    /// via [`clamp_limit`] / [`clamp_offset`].
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Cat>, sqlx::Error>;

    async fn find_by_id(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error>;

    /// Partial update. Returns the updated row, or `None` if the id is unknown.
    async fn update(&self, id: DocId, input: &UpdateCat) -> Result<Option<Cat>, sqlx::Error>;

    /// Delete a cat, returning the deleted row, or `None` if the id is unknown.
    async fn delete(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error>;

    /// Liveness probe for health checks.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Column list shared across queries to avoid repetition.
/// `index` is quoted because it is a keyword in Postgres.
const COLUMNS: &str = r#"id, "index", string, number, strings_array, created_at, updated_at"#;

/// Postgres-backed cat store.
#[derive(Clone)]
pub struct PgCatStore {
    pool: DbPool,
}

impl PgCatStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatStore for PgCatStore {
    async fn create(&self, input: &CreateCat) -> Result<Cat, sqlx::Error> {
        let query = format!(
            r#"INSERT INTO cats ("index", string, number, strings_array)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"#
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(&input.index)
            .bind(&input.string)
            .bind(input.number)
            .bind(&input.strings_array)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Cat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cats
             ORDER BY created_at, id
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cats WHERE id = $1");
        sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update(&self, id: DocId, input: &UpdateCat) -> Result<Option<Cat>, sqlx::Error> {
        let query = format!(
            r#"UPDATE cats SET
               "index" = COALESCE($2, "index"),
               string = COALESCE($3, string),
               number = COALESCE($4, number),
               strings_array = COALESCE($5, strings_array),
               updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"#
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .bind(&input.index)
            .bind(&input.string)
            .bind(input.number)
            .bind(&input.strings_array)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error> {
        let query = format!("DELETE FROM cats WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}

/// In-memory cat store for tests and local development.
#[derive(Default)]
pub struct MemoryCatStore {
    cats: RwLock<HashMap<DocId, Cat>>,
}

impl MemoryCatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatStore for MemoryCatStore {
    async fn create(&self, input: &CreateCat) -> Result<Cat, sqlx::Error> {
        let now = Utc::now();
        let cat = Cat {
            id: Uuid::new_v4(),
            index: input.index.clone(),
            string: input.string.clone(),
            number: input.number,
            strings_array: input.strings_array.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut cats = self.cats.write().await;
        cats.insert(cat.id, cat.clone());
        Ok(cat)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Cat>, sqlx::Error> {
        let cats = self.cats.read().await;
        let mut all: Vec<Cat> = cats.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_by_id(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error> {
        let cats = self.cats.read().await;
        Ok(cats.get(&id).cloned())
    }

    async fn update(&self, id: DocId, input: &UpdateCat) -> Result<Option<Cat>, sqlx::Error> {
        let mut cats = self.cats.write().await;
        let Some(cat) = cats.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(index) = &input.index {
            cat.index = index.clone();
        }
        if let Some(string) = &input.string {
            cat.string = Some(string.clone());
        }
        if let Some(number) = input.number {
            cat.number = Some(number);
        }
        if let Some(strings_array) = &input.strings_array {
            cat.strings_array = Some(strings_array.clone());
        }
        cat.updated_at = Utc::now();
        Ok(Some(cat.clone()))
    }

    async fn delete(&self, id: DocId) -> Result<Option<Cat>, sqlx::Error> {
        let mut cats = self.cats.write().await;
        Ok(cats.remove(&id))
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
