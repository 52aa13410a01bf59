use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use crate::{
    OwnerId, Page, Pet, PetChanges, PetFilter, PetId, PetQuery, Result, StoreError,
    store::PetStore,
};

const PET_COLUMNS: &str = "id, owner_id, name, description, kind, breed, last_seen_time, \
     last_seen_place, is_found, picture_url, created_at, updated_at";

/// PostgreSQL-backed pet store implementation.
#[derive(Clone)]
pub struct PostgresPetStore {
    pool: PgPool,
}

impl PostgresPetStore {
    /// Creates a new PostgreSQL pet store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("pet store migrations applied");
        Ok(())
    }

    fn row_to_pet(row: PgRow) -> Result<Pet> {
        Ok(Pet {
            id: PetId::from_uuid(row.try_get::<Uuid, _>("id")?),
            owner_id: OwnerId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            kind: row.try_get("kind")?,
            breed: row.try_get("breed")?,
            last_seen_time: row.try_get("last_seen_time")?,
            last_seen_place: row.try_get("last_seen_place")?,
            is_found: row.try_get("is_found")?,
            picture_url: row.try_get("picture_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Builds the WHERE clause for a filter. Placeholders are numbered in the
    /// same order `bind_filter` binds values.
    fn where_clause(filter: &PetFilter) -> (String, usize) {
        let mut sql = String::from(" WHERE 1=1");
        let mut param_count = 0;

        if filter.kind.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND kind = ${param_count}"));
        }
        if filter.breed.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND breed ILIKE ${param_count}"));
        }
        if filter.last_seen_place.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND last_seen_place ILIKE ${param_count}"));
        }
        if filter.owner_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND owner_id = ${param_count}"));
        }

        (sql, param_count)
    }

    fn bind_filter<'q>(
        mut query: Query<'q, Postgres, PgArguments>,
        filter: &PetFilter,
    ) -> Query<'q, Postgres, PgArguments> {
        if let Some(ref kind) = filter.kind {
            query = query.bind(kind.clone());
        }
        if let Some(ref breed) = filter.breed {
            query = query.bind(like_pattern(breed));
        }
        if let Some(ref place) = filter.last_seen_place {
            query = query.bind(like_pattern(place));
        }
        if let Some(owner_id) = filter.owner_id {
            query = query.bind(owner_id.as_uuid());
        }
        query
    }
}

/// Wraps a user-supplied fragment in `%…%`, escaping LIKE metacharacters.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl PetStore for PostgresPetStore {
    async fn insert(&self, pet: &Pet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pets (id, owner_id, name, description, kind, breed, last_seen_time,
                              last_seen_place, is_found, picture_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(pet.id.as_uuid())
        .bind(pet.owner_id.as_uuid())
        .bind(&pet.name)
        .bind(&pet.description)
        .bind(&pet.kind)
        .bind(&pet.breed)
        .bind(pet.last_seen_time)
        .bind(&pet.last_seen_place)
        .bind(pet.is_found)
        .bind(&pet.picture_url)
        .bind(pet.created_at)
        .bind(pet.updated_at)
        .execute(&self.pool)
        .await?;

        metrics::counter!("pet_store_inserts_total").increment(1);
        tracing::debug!(pet_id = %pet.id, "pet row inserted");
        Ok(())
    }

    async fn get(&self, id: PetId) -> Result<Option<Pet>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_pet).transpose()
    }

    async fn search(&self, query: &PetQuery) -> Result<Page<Pet>> {
        let (where_sql, param_count) = Self::where_clause(&query.filter);

        let count_sql = format!("SELECT COUNT(*) AS total FROM pets{where_sql}");
        let count_row = Self::bind_filter(sqlx::query(&count_sql), &query.filter)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.try_get("total")?;
        let total = u64::try_from(total).unwrap_or(0);
        tracing::debug!(total, page = query.page.page, "pet search counted");

        if total == 0 {
            return Ok(Page::new(Vec::new(), 0, &query.page));
        }

        let select_sql = format!(
            "SELECT {PET_COLUMNS} FROM pets{where_sql} ORDER BY created_at {dir}, id ASC LIMIT ${limit} OFFSET ${offset}",
            dir = query.page.sort_dir.as_sql(),
            limit = param_count + 1,
            offset = param_count + 2,
        );
        let rows = Self::bind_filter(sqlx::query(&select_sql), &query.filter)
            .bind(i64::try_from(query.page.limit()).unwrap_or(i64::MAX))
            .bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(Self::row_to_pet)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(data, total, &query.page))
    }

    async fn update(&self, id: PetId, changes: &PetChanges) -> Result<Pet> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let mut pet = match row {
            Some(row) => Self::row_to_pet(row)?,
            None => return Err(StoreError::NotFound(id)),
        };

        if changes.is_empty() {
            tx.commit().await?;
            return Ok(pet);
        }

        changes.apply_to(&mut pet);

        sqlx::query(
            r#"
            UPDATE pets
            SET name = $2, kind = $3, breed = $4, last_seen_time = $5, last_seen_place = $6,
                is_found = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&pet.name)
        .bind(&pet.kind)
        .bind(&pet.breed)
        .bind(pet.last_seen_time)
        .bind(&pet.last_seen_place)
        .bind(pet.is_found)
        .bind(pet.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(pet)
    }

    async fn mark_found(&self, id: PetId) -> Result<Option<Pet>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "UPDATE pets SET is_found = TRUE, updated_at = $2 \
             WHERE id = $1 AND is_found = FALSE RETURNING {PET_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Self::row_to_pet(row).map(Some);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pets WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(None)
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    async fn delete(&self, id: PetId) -> Result<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(pet_id = %id, "pet row deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_numbers_placeholders_in_bind_order() {
        let filter = PetFilter::new()
            .kind("dog")
            .last_seen_place("Salta")
            .owner(OwnerId::new());
        let (sql, count) = PostgresPetStore::where_clause(&filter);

        assert_eq!(count, 3);
        assert_eq!(
            sql,
            " WHERE 1=1 AND kind = $1 AND last_seen_place ILIKE $2 AND owner_id = $3"
        );
    }

    #[test]
    fn empty_filter_has_no_placeholders() {
        let (sql, count) = PostgresPetStore::where_clause(&PetFilter::new());
        assert_eq!(count, 0);
        assert_eq!(sql, " WHERE 1=1");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("golden"), "%golden%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
