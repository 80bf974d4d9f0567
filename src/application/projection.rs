//! Read shapes derived from loaded catalog subtrees.
//!
//! Counts are never persisted; they are recomputed from the children that the
//! store adapter loaded alongside the record. The projected shape, not the raw
//! record, is what the cache holds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{DishRecord, MenuRecord, SubmenuRecord};
use crate::domain::price::Price;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus_count: usize,
    pub dishes_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmenuView {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishView {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Price,
}

pub fn project_menu(record: &MenuRecord) -> MenuView {
    MenuView {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        submenus_count: record.submenus.len(),
        dishes_count: record.dishes().count(),
    }
}

pub fn project_submenu(record: &SubmenuRecord) -> SubmenuView {
    SubmenuView {
        id: record.id,
        menu_id: record.menu_id,
        title: record.title.clone(),
        description: record.description.clone(),
        dishes_count: record.dishes.len(),
    }
}

pub fn project_dish(record: &DishRecord) -> DishView {
    DishView {
        id: record.id,
        submenu_id: record.submenu_id,
        title: record.title.clone(),
        description: record.description.clone(),
        price: record.price,
    }
}
