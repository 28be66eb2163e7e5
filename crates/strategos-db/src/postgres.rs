use crate::models::{HistoryRecord, InventoryRecord, ProjectRecord};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use strategos_core::{
    Error as CoreError, History, HistoryStatus, Inventory, Project, ProjectStatus, Storage,
};
use uuid::Uuid;

fn storage_err(err: impl std::fmt::Display) -> CoreError {
    CoreError::Storage(err.to_string())
}

#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    /// Create new database connection
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                repository VARCHAR(2048) NOT NULL,
                status VARCHAR(32) NOT NULL,
                variables TEXT NOT NULL DEFAULT '{}',
                inventories UUID[] NOT NULL DEFAULT '{}',
                hosts UUID[] NOT NULL DEFAULT '{}',
                groups UUID[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                variables TEXT NOT NULL DEFAULT '{}',
                hosts UUID[] NOT NULL DEFAULT '{}',
                groups UUID[] NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS histories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                kind VARCHAR(16) NOT NULL,
                status VARCHAR(32) NOT NULL,
                start_time TIMESTAMPTZ NOT NULL,
                stop_time TIMESTAMPTZ,
                project_id UUID NOT NULL REFERENCES projects(id),
                inventory_id UUID NOT NULL REFERENCES inventories(id),
                raw_stdout TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_histories_status ON histories(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_histories_start_time ON histories(start_time DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Recent history records for a project, newest first.
    pub async fn recent_histories(&self, project_id: Uuid, limit: i64) -> Result<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            "SELECT * FROM histories WHERE project_id = $1 ORDER BY start_time DESC LIMIT $2",
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[async_trait]
impl Storage for Database {
    async fn create_project(&self, project: Project) -> strategos_core::Result<Project> {
        let record = ProjectRecord::from_domain(&project).map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, repository, status, variables,
                inventories, hosts, groups, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.repository)
        .bind(&record.status)
        .bind(&record.variables)
        .bind(&record.inventories)
        .bind(&record.hosts)
        .bind(&record.groups)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> strategos_core::Result<Option<Project>> {
        let record = sqlx::query_as::<_, ProjectRecord>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        record
            .map(|r| r.to_domain().map_err(storage_err))
            .transpose()
    }

    async fn set_project_status(
        &self,
        id: Uuid,
        status: ProjectStatus,
    ) -> strategos_core::Result<()> {
        let result = sqlx::query("UPDATE projects SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProjectNotFound(id));
        }

        Ok(())
    }

    async fn create_inventory(&self, inventory: Inventory) -> strategos_core::Result<Inventory> {
        let record = InventoryRecord::from_domain(&inventory).map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO inventories (id, name, variables, hosts, groups)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.variables)
        .bind(&record.hosts)
        .bind(&record.groups)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(inventory)
    }

    async fn get_inventory(&self, id: Uuid) -> strategos_core::Result<Option<Inventory>> {
        let record =
            sqlx::query_as::<_, InventoryRecord>("SELECT * FROM inventories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;

        record
            .map(|r| r.to_domain().map_err(storage_err))
            .transpose()
    }

    async fn create_history(&self, history: History) -> strategos_core::Result<History> {
        let record = HistoryRecord::from_domain(&history);

        sqlx::query(
            r#"
            INSERT INTO histories (
                id, name, kind, status, start_time, stop_time,
                project_id, inventory_id, raw_stdout
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.kind)
        .bind(&record.status)
        .bind(record.start_time)
        .bind(record.stop_time)
        .bind(record.project_id)
        .bind(record.inventory_id)
        .bind(&record.raw_stdout)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(history)
    }

    async fn get_history(&self, id: Uuid) -> strategos_core::Result<Option<History>> {
        let record = sqlx::query_as::<_, HistoryRecord>("SELECT * FROM histories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        record
            .map(|r| r.to_domain().map_err(storage_err))
            .transpose()
    }

    async fn set_history_status(
        &self,
        id: Uuid,
        status: HistoryStatus,
    ) -> strategos_core::Result<()> {
        let result = sqlx::query("UPDATE histories SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::HistoryNotFound(id));
        }

        Ok(())
    }

    async fn append_history_stdout(&self, id: Uuid, chunk: &str) -> strategos_core::Result<()> {
        let result = sqlx::query("UPDATE histories SET raw_stdout = raw_stdout || $1 WHERE id = $2")
            .bind(chunk)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::HistoryNotFound(id));
        }

        Ok(())
    }

    async fn finish_history(
        &self,
        id: Uuid,
        status: HistoryStatus,
        stop_time: DateTime<Utc>,
    ) -> strategos_core::Result<()> {
        let result = sqlx::query("UPDATE histories SET status = $1, stop_time = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(stop_time)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::HistoryNotFound(id));
        }

        Ok(())
    }

    async fn histories_by_status(
        &self,
        status: HistoryStatus,
    ) -> strategos_core::Result<Vec<History>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            "SELECT * FROM histories WHERE status = $1 ORDER BY start_time DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        records
            .iter()
            .map(|r| r.to_domain().map_err(storage_err))
            .collect()
    }
}
