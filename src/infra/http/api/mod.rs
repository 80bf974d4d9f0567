pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, post},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/menus",
            get(handlers::list_menus).post(handlers::create_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}",
            get(handlers::get_menu)
                .patch(handlers::update_menu)
                .delete(handlers::delete_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus",
            get(handlers::list_submenus).post(handlers::create_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}",
            get(handlers::get_submenu)
                .patch(handlers::update_submenu)
                .delete(handlers::delete_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes",
            get(handlers::list_dishes).post(handlers::create_dish),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}",
            get(handlers::get_dish)
                .patch(handlers::update_dish)
                .delete(handlers::delete_dish),
        )
        .route("/api/v1/load_data", post(handlers::load_data))
        .route(
            "/api/v1/reports/menus",
            post(handlers::submit_menus_report),
        )
        .route(
            "/api/v1/reports/menus/{task_id}",
            get(handlers::download_menus_report),
        )
        .route(
            "/api/v1/reports/menus/{task_id}/status",
            get(handlers::menus_report_status),
        )
        .with_state(state)
}
