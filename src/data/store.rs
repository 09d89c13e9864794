use crate::{
    config::DbConfig,
    data::student::{NewStudent, Student},
    error::{
        GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult,
    },
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};
use std::fmt::Debug;

/// Persistence for students, keyed by the store-issued ID.
///
/// Absent IDs are reported as `None`/`false` rather than as errors, so callers decide what not-found means.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn create(&self, student: NewStudent) -> RosterResult<Student>;
    async fn find_all(&self) -> RosterResult<Vec<Student>>;
    async fn find_by_id(&self, id: i32) -> RosterResult<Option<Student>>;
    async fn update(&self, id: i32, student: NewStudent) -> RosterResult<Option<Student>>;
    async fn delete_by_id(&self, id: i32) -> RosterResult<bool>;

    async fn close(&self) {}
}

#[derive(Debug, Clone)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

impl PostgresStudentStore {
    /// Opens the pool and brings the schema up to date before anything gets served.
    pub async fn connect(options: PgPoolOptions, db_config: &DbConfig) -> RosterResult<Self> {
        let pool = options
            .connect(&db_config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self::from_pool(pool))
    }

    /// Wraps a pool that's already been migrated.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn get_connection(&self) -> RosterResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn create(&self, student: NewStudent) -> RosterResult<Student> {
        let NewStudent { name, email } = student;

        sqlx::query_as::<_, Student>(
            "INSERT INTO public.students (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(name)
        .bind(email)
        .fetch_one(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn find_all(&self) -> RosterResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT id, name, email FROM public.students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn find_by_id(&self, id: i32) -> RosterResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT id, name, email FROM public.students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)
    }

    async fn update(&self, id: i32, student: NewStudent) -> RosterResult<Option<Student>> {
        let NewStudent { name, email } = student;

        sqlx::query_as::<_, Student>(
            "UPDATE public.students SET name = $2, email = $3 WHERE id = $1 RETURNING id, name, email",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn delete_by_id(&self, id: i32) -> RosterResult<bool> {
        let result = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub use memory::MemoryStudentStore;
