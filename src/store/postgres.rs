use crate::{
    config::DbConfig,
    data::student::{Student, UpdateStudent},
    error::{MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
    store::{Filter, StudentStore},
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use snafu::ResultExt;
use sqlx::{FromRow, Pool, Postgres, postgres::PgPoolOptions, types::Json};
use uuid::Uuid;

/// Students stored as JSONB documents in `public.students`, keyed internally by `_id`.
#[derive(Debug, Clone)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

#[derive(FromRow)]
struct StudentDocument {
    doc: Json<Student>,
}

impl PostgresStudentStore {
    pub async fn connect(options: PgPoolOptions, config: &DbConfig) -> RosterResult<Self> {
        let pool = options
            .connect(config.url().expose_secret())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn insert_one(&self, student: &Student) -> RosterResult<Uuid> {
        let key = Uuid::new_v4();
        sqlx::query("INSERT INTO public.students (_id, doc) VALUES ($1, $2)")
            .bind(key)
            .bind(Json(student))
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(key)
    }

    async fn find_one(&self, filter: Filter<'_>) -> RosterResult<Option<Student>> {
        let document = match filter {
            Filter::Id(id) => {
                sqlx::query_as::<_, StudentDocument>(
                    "SELECT doc FROM public.students WHERE doc ->> 'id' = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            Filter::InternalKey(key) => {
                sqlx::query_as::<_, StudentDocument>(
                    "SELECT doc FROM public.students WHERE _id = $1",
                )
                .bind(key)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .context(MakeQuerySnafu)?;

        Ok(document.map(|document| document.doc.0))
    }

    async fn find_many(&self, limit: usize) -> RosterResult<Vec<Student>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        Ok(
            sqlx::query_as::<_, StudentDocument>("SELECT doc FROM public.students LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .context(MakeQuerySnafu)?
                .into_iter()
                .map(|document| document.doc.0)
                .collect(),
        )
    }

    async fn update_one(&self, id: &str, changes: &UpdateStudent) -> RosterResult<u64> {
        //`@>` skips rows that already hold every value, matching "modified" rather than "matched"
        let result = sqlx::query(
            "UPDATE public.students SET doc = doc || $2 WHERE doc ->> 'id' = $1 AND NOT doc @> $2",
        )
        .bind(id)
        .bind(Json(changes))
        .execute(&self.pool)
        .await
        .context(MakeQuerySnafu)?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, id: &str) -> RosterResult<u64> {
        let result = sqlx::query("DELETE FROM public.students WHERE doc ->> 'id' = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
