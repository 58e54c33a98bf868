//! Category tree change notifications.
//!
//! Clients cache the category tree and re-download it when the published
//! category version moves. The tree records a [`TreeEvent`] for every
//! mutation; the service layer publishes them to [`TreeListener`]s once the
//! mutation has been committed.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A committed change to the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TreeEvent {
    /// A category was added.
    CategoryCreated {
        category_id: CategoryId,
        parent_id: Option<CategoryId>,
    },
    /// A category (and its subtree) moved under a new parent.
    CategoryReparented {
        category_id: CategoryId,
        old_parent_id: Option<CategoryId>,
        new_parent_id: Option<CategoryId>,
    },
}

impl TreeEvent {
    /// The category the event is about.
    pub fn category_id(&self) -> &CategoryId {
        match self {
            TreeEvent::CategoryCreated { category_id, .. } => category_id,
            TreeEvent::CategoryReparented { category_id, .. } => category_id,
        }
    }
}

/// Subscriber to committed tree changes.
pub trait TreeListener: Send + Sync {
    /// Called once per committed event, in commit order.
    fn on_tree_event(&self, event: &TreeEvent);
}

/// Monotonic category version, bumped on every tree change.
#[derive(Debug, Default)]
pub struct CategoryVersion {
    version: AtomicU64,
}

impl CategoryVersion {
    /// Start at a known version (e.g. loaded from settings).
    pub fn starting_at(version: u64) -> Self {
        Self {
            version: AtomicU64::new(version),
        }
    }

    /// Current version.
    pub fn current(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl TreeListener for CategoryVersion {
    fn on_tree_event(&self, _event: &TreeEvent) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }
}
