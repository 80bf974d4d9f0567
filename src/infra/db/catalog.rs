//! Row types and subtree loaders shared by the catalog adapters.

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    application::repos::RepoError,
    domain::{
        entities::{DishRecord, MenuRecord, SubmenuRecord},
        price::Price,
    },
};

use super::map_sqlx_error;

#[derive(sqlx::FromRow)]
pub(super) struct MenuRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct SubmenuRow {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct DishRow {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

impl TryFrom<DishRow> for DishRecord {
    type Error = RepoError;

    fn try_from(row: DishRow) -> Result<Self, Self::Error> {
        let price = Price::from_str(&row.price).map_err(|err| RepoError::Integrity {
            message: format!("dish `{}` has an unreadable price: {err}", row.id),
        })?;

        Ok(Self {
            id: row.id,
            submenu_id: row.submenu_id,
            title: row.title,
            description: row.description,
            price,
        })
    }
}

pub(super) const DISH_COLUMNS: &str = "id, submenu_id, title, description, price::text AS price";

pub(super) async fn load_dishes(
    pool: &PgPool,
    submenu_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<DishRecord>>, RepoError> {
    let mut grouped: HashMap<Uuid, Vec<DishRecord>> = HashMap::new();
    if submenu_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query_as::<_, DishRow>(&format!(
        "SELECT {DISH_COLUMNS} FROM dishes WHERE submenu_id = ANY($1) ORDER BY created_at, id"
    ))
    .bind(submenu_ids)
    .fetch_all(pool)
    .await
    .map_err(map_sqlx_error)?;

    for row in rows {
        let dish = DishRecord::try_from(row)?;
        grouped.entry(dish.submenu_id).or_default().push(dish);
    }
    Ok(grouped)
}

/// Attach dishes to submenu rows, preserving row order.
pub(super) async fn hydrate_submenus(
    pool: &PgPool,
    rows: Vec<SubmenuRow>,
) -> Result<Vec<SubmenuRecord>, RepoError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut dishes = load_dishes(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| SubmenuRecord {
            dishes: dishes.remove(&row.id).unwrap_or_default(),
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
        })
        .collect())
}

/// Attach full submenu subtrees to menu rows, preserving row order.
pub(super) async fn hydrate_menus(
    pool: &PgPool,
    rows: Vec<MenuRow>,
) -> Result<Vec<MenuRecord>, RepoError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let submenu_rows = sqlx::query_as::<_, SubmenuRow>(
        "SELECT id, menu_id, title, description FROM submenus \
         WHERE menu_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(map_sqlx_error)?;

    let mut grouped: HashMap<Uuid, Vec<SubmenuRecord>> = HashMap::new();
    for submenu in hydrate_submenus(pool, submenu_rows).await? {
        grouped.entry(submenu.menu_id).or_default().push(submenu);
    }

    Ok(rows
        .into_iter()
        .map(|row| MenuRecord {
            submenus: grouped.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
            description: row.description,
        })
        .collect())
}
