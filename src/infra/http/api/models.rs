use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    DishPatch, MenuPatch, NewDish, NewMenu, NewSubmenu, SubmenuPatch,
};
use crate::domain::price::Price;

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuCreateRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmenuCreateRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SubmenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishCreateRequest {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DishUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

impl From<MenuCreateRequest> for NewMenu {
    fn from(request: MenuCreateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

impl From<MenuUpdateRequest> for MenuPatch {
    fn from(request: MenuUpdateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

impl From<SubmenuCreateRequest> for NewSubmenu {
    fn from(request: SubmenuCreateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

impl From<SubmenuUpdateRequest> for SubmenuPatch {
    fn from(request: SubmenuUpdateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

impl From<DishCreateRequest> for NewDish {
    fn from(request: DishCreateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            price: request.price,
        }
    }
}

impl From<DishUpdateRequest> for DishPatch {
    fn from(request: DishUpdateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            price: request.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
