use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::models::{Faculty, User, UserChanges};
use crate::database::store::{AdminInsert, HierarchyStore, StoreError};

const USER_COLUMNS: &str = "id, role, name, email, department, password_hash, parent_admin, \
     created_by, admin_level, hierarchy_path, created_at, updated_at";

const FACULTY_COLUMNS: &str =
    "id, user_id, name, email, department, created_by, created_at, updated_at";

/// Postgres-backed hierarchy store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using `DATABASE_URL` and run embedded migrations.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("Connected to database and applied migrations");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HierarchyStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn faculty_by_id(&self, id: Uuid) -> Result<Option<Faculty>, StoreError> {
        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(faculty)
    }

    async fn count_sub_admins(&self, parent: Uuid) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE parent_admin = $1 AND role = 'admin'",
        )
        .bind(parent)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn count_users_created_by(&self, admin: Uuid) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_by = $1")
            .bind(admin)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn count_faculty_created_by(&self, admin: Uuid) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM faculty WHERE created_by = $1")
            .bind(admin)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn users_created_by(&self, admin: Uuid) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(admin)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn faculty_created_by(&self, admin: Uuid) -> Result<Vec<Faculty>, StoreError> {
        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(admin)
        .fetch_all(&self.pool)
        .await?;
        Ok(faculty)
    }

    async fn admins_in_subtree(&self, root: Uuid) -> Result<Vec<User>, StoreError> {
        // Normalizing both sides with '/' delimiters makes the containment
        // check exact on id segments rather than substrings.
        let admins = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE role = 'admin' \
               AND (parent_admin = $1 OR '/' || hierarchy_path || '/' LIKE '%/' || $1::text || '/%') \
             ORDER BY admin_level, created_at"
        ))
        .bind(root)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }

    async fn insert_admin_guarded(
        &self,
        user: User,
        max_children: i64,
    ) -> Result<AdminInsert, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent) = user.parent_admin {
            // Lock the parent row so concurrent sibling creations serialize
            // on the count check.
            sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(parent)
                .fetch_optional(&mut *tx)
                .await?;

            let count: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM users WHERE parent_admin = $1 AND role = 'admin'",
            )
            .bind(parent)
            .fetch_one(&mut *tx)
            .await?;

            if count.0 >= max_children {
                tx.rollback().await?;
                return Ok(AdminInsert::LimitReached);
            }
        }

        let inserted = insert_user_tx(&mut tx, &user).await?;
        tx.commit().await?;
        Ok(AdminInsert::Created(inserted))
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_user_tx(&mut tx, &user).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_faculty_account(
        &self,
        account: User,
        faculty: Faculty,
    ) -> Result<(User, Faculty), StoreError> {
        let mut tx = self.pool.begin().await?;
        let account = insert_user_tx(&mut tx, &account).await?;

        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "INSERT INTO faculty (id, user_id, name, email, department, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {FACULTY_COLUMNS}"
        ))
        .bind(faculty.id)
        .bind(faculty.user_id)
        .bind(&faculty.name)
        .bind(&faculty.email)
        .bind(&faculty.department)
        .bind(faculty.created_by)
        .bind(faculty.created_at)
        .bind(faculty.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((account, faculty))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 department = COALESCE($4, department), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.department)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_user_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &User,
) -> Result<User, StoreError> {
    let inserted = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, role, name, email, department, password_hash, parent_admin, \
                            created_by, admin_level, hierarchy_path, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .bind(user.role)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.department)
    .bind(&user.password_hash)
    .bind(user.parent_admin)
    .bind(user.created_by)
    .bind(user.admin_level)
    .bind(&user.hierarchy_path)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&mut **tx)
    .await?;
    Ok(inserted)
}
