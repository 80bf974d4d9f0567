//! Shared domain enumerations aligned with persisted values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three levels of the catalog hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Menu,
    Submenu,
    Dish,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Menu => "menu",
            EntityKind::Submenu => "submenu",
            EntityKind::Dish => "dish",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Menu => "menus",
            EntityKind::Submenu => "submenus",
            EntityKind::Dish => "dishes",
        }
    }

    /// Kind of the entity that owns this one, if any.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            EntityKind::Menu => None,
            EntityKind::Submenu => Some(EntityKind::Menu),
            EntityKind::Dish => Some(EntityKind::Submenu),
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            EntityKind::Menu => "menu not found",
            EntityKind::Submenu => "submenu not found",
            EntityKind::Dish => "dish not found",
        }
    }

    pub fn deleted_message(self) -> &'static str {
        match self {
            EntityKind::Menu => "The menu has been deleted",
            EntityKind::Submenu => "The submenu has been deleted",
            EntityKind::Dish => "The dish has been deleted",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a spreadsheet export task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Success,
    Failure,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Success => "success",
            ReportStatus::Failure => "failure",
        }
    }

    pub fn is_finished(self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }
}

impl TryFrom<&str> for ReportStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(ReportStatus::Pending),
            "success" => Ok(ReportStatus::Success),
            "failure" => Ok(ReportStatus::Failure),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    ExportMenuReport,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::ExportMenuReport => "export_menu_report",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_status_round_trips_through_text() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::Success,
            ReportStatus::Failure,
        ] {
            assert_eq!(ReportStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(ReportStatus::try_from("PENDING").is_err());
    }

    #[test]
    fn entity_kinds_know_their_parent() {
        assert_eq!(EntityKind::Menu.parent(), None);
        assert_eq!(EntityKind::Submenu.parent(), Some(EntityKind::Menu));
        assert_eq!(EntityKind::Dish.parent(), Some(EntityKind::Submenu));
        assert_eq!(EntityKind::Dish.not_found_message(), "dish not found");
    }
}
