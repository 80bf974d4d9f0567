use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{CatalogRepo, RepoError},
    domain::{
        entities::{NewSubmenu, SubmenuPatch, SubmenuRecord},
        types::EntityKind,
    },
};

use super::{
    PostgresRepositories,
    catalog::{SubmenuRow, hydrate_submenus},
    map_sqlx_error,
};

const SUBMENU_COLUMNS: &str = "id, menu_id, title, description";

#[async_trait]
impl CatalogRepo<SubmenuRecord> for PostgresRepositories {
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<SubmenuRecord>, RepoError> {
        let menu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Submenu))?;
        let rows = sqlx::query_as::<_, SubmenuRow>(&format!(
            "SELECT {SUBMENU_COLUMNS} FROM submenus WHERE menu_id = $1 ORDER BY created_at, id"
        ))
        .bind(menu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        hydrate_submenus(self.pool(), rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<SubmenuRecord>, RepoError> {
        let row = sqlx::query_as::<_, SubmenuRow>(&format!(
            "SELECT {SUBMENU_COLUMNS} FROM submenus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate_submenus(self.pool(), vec![row]).await?.pop())
    }

    async fn create(
        &self,
        parent: Option<Uuid>,
        draft: NewSubmenu,
    ) -> Result<SubmenuRecord, RepoError> {
        let menu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Submenu))?;
        let row = sqlx::query_as::<_, SubmenuRow>(&format!(
            "INSERT INTO submenus (id, menu_id, title, description) \
             VALUES ($1, $2, $3, $4) RETURNING {SUBMENU_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(menu_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SubmenuRecord {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
            dishes: Vec::new(),
        })
    }

    async fn update(&self, id: Uuid, patch: SubmenuPatch) -> Result<SubmenuRecord, RepoError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE submenus
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   updated_at = now()
             WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if updated.is_none() {
            return Err(RepoError::NotFound);
        }
        CatalogRepo::<SubmenuRecord>::find(self, id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM dishes WHERE submenu_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let result = sqlx::query("DELETE FROM submenus WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        tx.commit().await.map_err(map_sqlx_error)
    }
}
