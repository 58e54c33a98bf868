//! Category types for ad classification.

use std::collections::BTreeSet;

use crate::ids::{CategoryId, CountryId, FormId};
use serde::{Deserialize, Serialize};

/// Visibility status shared by categories and ads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Visible and usable.
    #[default]
    Active,
    /// Hidden, data preserved.
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }
}

/// A category in the classification hierarchy.
///
/// The `ancestors` and `descendants` sets are a materialized closure of the
/// parent links. They are maintained by [`CategoryTree`](super::CategoryTree)
/// and must not be edited directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name, unique among siblings of the same country.
    pub name: String,
    /// Depth in the hierarchy (1 = root).
    pub level: i32,
    /// Country whose users see this category and its ads.
    pub country_id: CountryId,
    /// Visibility status.
    pub status: Status,
    /// Parent category ID (None for root categories).
    pub parent_id: Option<CategoryId>,
    /// Attribute form attached to the category.
    pub form_id: Option<FormId>,
    /// Every transitive parent.
    pub ancestors: BTreeSet<CategoryId>,
    /// Every transitive child.
    pub descendants: BTreeSet<CategoryId>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: Option<i64>,
}

impl Category {
    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if ads may be filed directly under this category.
    pub fn is_selectable(&self) -> bool {
        self.descendants.is_empty()
    }

    /// Check if this category is a strict ancestor of another.
    pub fn is_ancestor_of(&self, other: &Category) -> bool {
        other.ancestors.contains(&self.id)
    }

    /// Check if this category is a strict descendant of another.
    pub fn is_descendant_of(&self, other: &Category) -> bool {
        self.ancestors.contains(&other.id)
    }

    /// Check if `root` is this category or one of its ancestors.
    pub fn is_within(&self, root: &CategoryId) -> bool {
        &self.id == root || self.ancestors.contains(root)
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    /// Explicit ID; generated when absent.
    #[serde(default)]
    pub id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// Owning country.
    pub country_id: CountryId,
    /// Parent category.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Attribute form.
    #[serde(default)]
    pub form_id: Option<FormId>,
}

impl NewCategory {
    /// Describe a new root category.
    pub fn new(name: impl Into<String>, country_id: impl Into<CountryId>) -> Self {
        Self {
            id: None,
            name: name.into(),
            country_id: country_id.into(),
            parent_id: None,
            form_id: None,
        }
    }

    /// Use a fixed ID instead of a generated one.
    pub fn with_id(mut self, id: impl Into<CategoryId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Place the category under a parent.
    pub fn with_parent(mut self, parent_id: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Attach an attribute form.
    pub fn with_form(mut self, form_id: impl Into<FormId>) -> Self {
        self.form_id = Some(form_id.into());
        self
    }
}
