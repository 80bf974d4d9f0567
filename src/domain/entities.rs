//! Domain entities mirrored from persistent storage.
//!
//! Menu and submenu records carry their loaded children, so every record
//! handed out by a store adapter is a complete subtree.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::price::Price;
use crate::domain::types::ReportStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus: Vec<SubmenuRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmenuRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes: Vec<DishRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DishRecord {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDish {
    pub title: String,
    pub description: String,
    pub price: Price,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmenuPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DishPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

impl MenuRecord {
    pub fn dishes(&self) -> impl Iterator<Item = &DishRecord> {
        self.submenus.iter().flat_map(|submenu| submenu.dishes.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub id: Uuid,
    pub status: ReportStatus,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub created_at: OffsetDateTime,
    pub finished_at: Option<OffsetDateTime>,
}
