use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::projection::{
    DishView, MenuView, SubmenuView, project_dish, project_menu, project_submenu,
};
use crate::application::repos::CatalogRepo;
use crate::cache::{CacheKey, SnapshotCache};
use crate::domain::entities::{
    DishPatch, DishRecord, MenuPatch, MenuRecord, NewDish, NewMenu, NewSubmenu, SubmenuPatch,
    SubmenuRecord,
};
use crate::domain::types::EntityKind;

use super::{CachedCrud, CatalogError};

const TARGET: &str = "menu_catalog::catalog";

/// Entry point for catalog reads and writes.
///
/// Resolves the parent chain of nested operations and decides which cache
/// entries of other kinds a write makes stale.
pub struct CatalogService {
    menus: CachedCrud<MenuRecord, MenuView>,
    submenus: CachedCrud<SubmenuRecord, SubmenuView>,
    dishes: CachedCrud<DishRecord, DishView>,
}

impl CatalogService {
    pub fn new(
        menus: Arc<dyn CatalogRepo<MenuRecord>>,
        submenus: Arc<dyn CatalogRepo<SubmenuRecord>>,
        dishes: Arc<dyn CatalogRepo<DishRecord>>,
        cache: SnapshotCache,
        store_timeout: Duration,
    ) -> Self {
        Self {
            menus: CachedCrud::new(menus, cache.clone(), project_menu, store_timeout),
            submenus: CachedCrud::new(submenus, cache.clone(), project_submenu, store_timeout),
            dishes: CachedCrud::new(dishes, cache, project_dish, store_timeout),
        }
    }

    pub async fn list_menus(&self) -> Result<Vec<MenuView>, CatalogError> {
        self.menus.list(None).await
    }

    pub async fn get_menu(&self, menu_id: Uuid) -> Result<MenuView, CatalogError> {
        self.menus.get(menu_id).await
    }

    pub async fn create_menu(&self, draft: NewMenu) -> Result<MenuView, CatalogError> {
        let view = self.menus.create(None, draft, &[]).await?;
        info!(target = TARGET, menu_id = %view.id, "menu created");
        Ok(view)
    }

    pub async fn update_menu(
        &self,
        menu_id: Uuid,
        patch: MenuPatch,
    ) -> Result<MenuView, CatalogError> {
        self.menus.update(menu_id, patch).await
    }

    pub async fn delete_menu(&self, menu_id: Uuid) -> Result<(), CatalogError> {
        let mut related = Vec::new();
        match self.menus.load(menu_id).await {
            Ok(Some(menu)) => {
                related.push(CacheKey::list(EntityKind::Submenu, Some(menu.id)));
                for submenu in &menu.submenus {
                    related.extend(submenu_subtree_keys(submenu));
                }
            }
            Ok(None) => {}
            Err(err) => warn!(
                target = TARGET,
                menu_id = %menu_id,
                error = %err,
                "could not load subtree before delete; descendants rely on TTL"
            ),
        }

        self.menus.delete(menu_id, None, &related).await?;
        info!(
            target = TARGET,
            menu_id = %menu_id,
            invalidated = related.len(),
            "menu deleted"
        );
        Ok(())
    }

    pub async fn list_submenus(&self, menu_id: Uuid) -> Result<Vec<SubmenuView>, CatalogError> {
        self.menus.get(menu_id).await?;
        self.submenus.list(Some(menu_id)).await
    }

    pub async fn get_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<SubmenuView, CatalogError> {
        self.menus.get(menu_id).await?;
        let view = self.submenus.get(submenu_id).await?;
        if view.menu_id != menu_id {
            return Err(CatalogError::NotFound(EntityKind::Submenu));
        }
        Ok(view)
    }

    pub async fn create_submenu(
        &self,
        menu_id: Uuid,
        draft: NewSubmenu,
    ) -> Result<SubmenuView, CatalogError> {
        self.menus.get(menu_id).await?;
        let view = self
            .submenus
            .create(Some(menu_id), draft, &menu_aggregate_keys(menu_id))
            .await?;
        info!(
            target = TARGET,
            menu_id = %menu_id,
            submenu_id = %view.id,
            "submenu created"
        );
        Ok(view)
    }

    pub async fn update_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        patch: SubmenuPatch,
    ) -> Result<SubmenuView, CatalogError> {
        self.get_submenu(menu_id, submenu_id).await?;
        self.submenus.update(submenu_id, patch).await
    }

    pub async fn delete_submenu(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<(), CatalogError> {
        self.get_submenu(menu_id, submenu_id).await?;

        let mut related = menu_aggregate_keys(menu_id).to_vec();
        match self.submenus.load(submenu_id).await {
            Ok(Some(submenu)) => related.extend(submenu_subtree_keys(&submenu)),
            Ok(None) => {}
            Err(err) => warn!(
                target = TARGET,
                submenu_id = %submenu_id,
                error = %err,
                "could not load subtree before delete; descendants rely on TTL"
            ),
        }

        self.submenus
            .delete(submenu_id, Some(menu_id), &related)
            .await?;
        info!(
            target = TARGET,
            menu_id = %menu_id,
            submenu_id = %submenu_id,
            "submenu deleted"
        );
        Ok(())
    }

    pub async fn list_dishes(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishView>, CatalogError> {
        self.get_submenu(menu_id, submenu_id).await?;
        self.dishes.list(Some(submenu_id)).await
    }

    pub async fn get_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<DishView, CatalogError> {
        self.get_submenu(menu_id, submenu_id).await?;
        let view = self.dishes.get(dish_id).await?;
        if view.submenu_id != submenu_id {
            return Err(CatalogError::NotFound(EntityKind::Dish));
        }
        Ok(view)
    }

    pub async fn create_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        draft: NewDish,
    ) -> Result<DishView, CatalogError> {
        self.get_submenu(menu_id, submenu_id).await?;
        let view = self
            .dishes
            .create(
                Some(submenu_id),
                draft,
                &submenu_aggregate_keys(menu_id, submenu_id),
            )
            .await?;
        info!(
            target = TARGET,
            submenu_id = %submenu_id,
            dish_id = %view.id,
            "dish created"
        );
        Ok(view)
    }

    pub async fn update_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        patch: DishPatch,
    ) -> Result<DishView, CatalogError> {
        self.get_dish(menu_id, submenu_id, dish_id).await?;
        self.dishes.update(dish_id, patch).await
    }

    pub async fn delete_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<(), CatalogError> {
        self.get_dish(menu_id, submenu_id, dish_id).await?;
        self.dishes
            .delete(
                dish_id,
                Some(submenu_id),
                &submenu_aggregate_keys(menu_id, submenu_id),
            )
            .await?;
        info!(
            target = TARGET,
            submenu_id = %submenu_id,
            dish_id = %dish_id,
            "dish deleted"
        );
        Ok(())
    }
}

/// Entries holding a menu's counts: its item and the root menu list.
fn menu_aggregate_keys(menu_id: Uuid) -> [CacheKey; 2] {
    [
        CacheKey::item(EntityKind::Menu, menu_id),
        CacheKey::list(EntityKind::Menu, None),
    ]
}

/// Entries holding a submenu's counts and, transitively, its menu's counts.
fn submenu_aggregate_keys(menu_id: Uuid, submenu_id: Uuid) -> [CacheKey; 4] {
    let [menu_item, menu_list] = menu_aggregate_keys(menu_id);
    [
        CacheKey::item(EntityKind::Submenu, submenu_id),
        CacheKey::list(EntityKind::Submenu, Some(menu_id)),
        menu_item,
        menu_list,
    ]
}

/// Every entry describing the submenu or one of its dishes.
fn submenu_subtree_keys(submenu: &SubmenuRecord) -> Vec<CacheKey> {
    let mut keys = Vec::with_capacity(submenu.dishes.len() + 2);
    keys.push(CacheKey::item(EntityKind::Submenu, submenu.id));
    keys.push(CacheKey::list(EntityKind::Dish, Some(submenu.id)));
    keys.extend(
        submenu
            .dishes
            .iter()
            .map(|dish| CacheKey::item(EntityKind::Dish, dish.id)),
    );
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_writes_touch_both_ancestor_levels() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let keys = submenu_aggregate_keys(menu_id, submenu_id);

        assert!(keys.contains(&CacheKey::item(EntityKind::Submenu, submenu_id)));
        assert!(keys.contains(&CacheKey::item(EntityKind::Menu, menu_id)));
        assert!(keys.contains(&CacheKey::list(EntityKind::Submenu, Some(menu_id))));
        assert!(keys.contains(&CacheKey::list(EntityKind::Menu, None)));
    }

    #[test]
    fn subtree_keys_cover_every_dish() {
        let submenu_id = Uuid::new_v4();
        let dishes: Vec<DishRecord> = (0..3)
            .map(|i| DishRecord {
                id: Uuid::new_v4(),
                submenu_id,
                title: format!("dish-{i}"),
                description: String::new(),
                price: "1.00".parse().expect("price"),
            })
            .collect();
        let submenu = SubmenuRecord {
            id: submenu_id,
            menu_id: Uuid::new_v4(),
            title: "Soups".into(),
            description: String::new(),
            dishes: dishes.clone(),
        };

        let keys = submenu_subtree_keys(&submenu);
        assert_eq!(keys.len(), 5);
        for dish in &dishes {
            assert!(keys.contains(&CacheKey::item(EntityKind::Dish, dish.id)));
        }
    }
}
