//! Bulk loading of catalog fixtures from a JSON document.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{
    application::catalog::{CatalogError, CatalogService},
    domain::{
        entities::{NewDish, NewMenu, NewSubmenu},
        price::Price,
    },
};

const TARGET: &str = "menu_catalog::seed";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMenu {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub submenus: Vec<SeedSubmenu>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSubmenu {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dishes: Vec<SeedDish>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDish {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub menus: usize,
    pub submenus: usize,
    pub dishes: usize,
}

pub fn parse_seed(raw: &str) -> Result<Vec<SeedMenu>, SeedError> {
    Ok(serde_json::from_str(raw)?)
}

/// Read and apply the seed document at `path`.
pub async fn load_seed_file(
    catalog: &CatalogService,
    path: &Path,
) -> Result<SeedSummary, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let menus = parse_seed(&raw)?;
    let summary = load_seed(catalog, menus).await?;
    info!(
        target = TARGET,
        file = %path.display(),
        menus = summary.menus,
        submenus = summary.submenus,
        dishes = summary.dishes,
        "seed data loaded"
    );
    Ok(summary)
}

/// Create every entity through the catalog so cache invalidation applies.
pub async fn load_seed(
    catalog: &CatalogService,
    menus: Vec<SeedMenu>,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for menu in menus {
        let created = catalog
            .create_menu(NewMenu {
                title: menu.title,
                description: menu.description,
            })
            .await?;
        summary.menus += 1;

        for submenu in menu.submenus {
            let created_submenu = catalog
                .create_submenu(
                    created.id,
                    NewSubmenu {
                        title: submenu.title,
                        description: submenu.description,
                    },
                )
                .await?;
            summary.submenus += 1;

            for dish in submenu.dishes {
                catalog
                    .create_dish(
                        created.id,
                        created_submenu.id,
                        NewDish {
                            title: dish.title,
                            description: dish.description,
                            price: dish.price,
                        },
                    )
                    .await?;
                summary.dishes += 1;
            }
        }
    }

    Ok(summary)
}
