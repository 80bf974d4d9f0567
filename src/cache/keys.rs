//! Cache key definitions.
//!
//! Item snapshots are keyed by the entity id alone. List snapshots are keyed by
//! entity kind and owning parent, so the submenus of one menu never share an
//! entry with the submenus of another.

use uuid::Uuid;

use crate::domain::types::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Item { kind: EntityKind, id: Uuid },
    List { kind: EntityKind, parent: Option<Uuid> },
}

impl CacheKey {
    pub fn item(kind: EntityKind, id: Uuid) -> Self {
        Self::Item { kind, id }
    }

    pub fn list(kind: EntityKind, parent: Option<Uuid>) -> Self {
        Self::List { kind, parent }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Item { kind, .. } | Self::List { kind, .. } => *kind,
        }
    }

    /// Render the storage key, prepending the configured namespace prefix.
    pub fn render(&self, prefix: &str) -> String {
        match self {
            Self::Item { id, .. } => format!("{prefix}{id}"),
            Self::List { kind, parent: None } => format!("{prefix}{}_list", kind.plural()),
            Self::List {
                kind,
                parent: Some(parent),
            } => format!("{prefix}{}_list:{parent}", kind.plural()),
        }
    }
}
