use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{CatalogRepo, RepoError},
    domain::entities::{MenuPatch, MenuRecord, NewMenu},
};

use super::{
    PostgresRepositories,
    catalog::{MenuRow, hydrate_menus},
    map_sqlx_error,
};

#[async_trait]
impl CatalogRepo<MenuRecord> for PostgresRepositories {
    async fn list(&self, _parent: Option<Uuid>) -> Result<Vec<MenuRecord>, RepoError> {
        let rows = sqlx::query_as::<_, MenuRow>(
            "SELECT id, title, description FROM menus ORDER BY created_at, id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        hydrate_menus(self.pool(), rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        let row = sqlx::query_as::<_, MenuRow>(
            "SELECT id, title, description FROM menus WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate_menus(self.pool(), vec![row]).await?.pop())
    }

    async fn create(&self, _parent: Option<Uuid>, draft: NewMenu) -> Result<MenuRecord, RepoError> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            INSERT INTO menus (id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(MenuRecord {
            id: row.id,
            title: row.title,
            description: row.description,
            submenus: Vec::new(),
        })
    }

    async fn update(&self, id: Uuid, patch: MenuPatch) -> Result<MenuRecord, RepoError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE menus
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
        CatalogRepo::<MenuRecord>::find(self, id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "DELETE FROM dishes WHERE submenu_id IN (SELECT id FROM submenus WHERE menu_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM submenus WHERE menu_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
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
