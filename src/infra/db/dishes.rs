use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{CatalogRepo, RepoError},
    domain::{
        entities::{DishPatch, DishRecord, NewDish},
        types::EntityKind,
    },
};

use super::{
    PostgresRepositories,
    catalog::{DISH_COLUMNS, DishRow},
    map_sqlx_error,
};

#[async_trait]
impl CatalogRepo<DishRecord> for PostgresRepositories {
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<DishRecord>, RepoError> {
        let submenu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Dish))?;
        let rows = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE submenu_id = $1 ORDER BY created_at, id"
        ))
        .bind(submenu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DishRecord::try_from).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRecord::try_from).transpose()
    }

    async fn create(&self, parent: Option<Uuid>, draft: NewDish) -> Result<DishRecord, RepoError> {
        let submenu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Dish))?;
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "INSERT INTO dishes (id, submenu_id, title, description, price) \
             VALUES ($1, $2, $3, $4, $5::numeric) RETURNING {DISH_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(submenu_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price.to_string())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        DishRecord::try_from(row)
    }

    async fn update(&self, id: Uuid, patch: DishPatch) -> Result<DishRecord, RepoError> {
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "UPDATE dishes \
                SET title = COALESCE($2, title), \
                    description = COALESCE($3, description), \
                    price = COALESCE($4::numeric, price), \
                    updated_at = now() \
              WHERE id = $1 \
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.price.map(|price| price.to_string()))
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRecord::try_from)
            .transpose()?
            .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
