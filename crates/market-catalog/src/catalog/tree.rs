//! The category hierarchy and its materialized ancestor/descendant closure.

use std::collections::{BTreeSet, HashMap};

use super::category::{Category, NewCategory, Status};
use super::current_timestamp;
use super::events::TreeEvent;
use crate::error::CatalogError;
use crate::ids::{CategoryId, CountryId};

/// All categories of the marketplace, keyed by ID.
///
/// Every category carries explicit `ancestors` and `descendants` sets. The
/// mutators keep them consistent with the parent links:
///
/// - `ancestors(c) == ancestors(parent(c)) ∪ {parent(c)}`, or empty for a root
/// - `c ∈ descendants(a)` for every `a ∈ ancestors(c)`
/// - `level(c) == level(parent(c)) + 1`, or 1 for a root
/// - `c ∉ ancestors(c)`
///
/// Mutators validate before touching any category, so a failed call leaves
/// the tree unchanged. Each successful mutation records the IDs it touched
/// and a [`TreeEvent`]; callers persist and publish them with
/// [`take_dirty`](Self::take_dirty) and [`take_events`](Self::take_events).
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: HashMap<CategoryId, Category>,
    dirty: BTreeSet<CategoryId>,
    pending: Vec<TreeEvent>,
}

impl CategoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from persisted categories, checking the closure.
    pub fn from_categories(
        categories: impl IntoIterator<Item = Category>,
    ) -> Result<Self, CatalogError> {
        let tree = Self {
            categories: categories
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            dirty: BTreeSet::new(),
            pending: Vec::new(),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if the tree has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category.
    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Look up a category, failing if it does not exist.
    pub fn require(&self, id: &CategoryId) -> Result<&Category, CatalogError> {
        self.categories
            .get(id)
            .ok_or_else(|| CatalogError::CategoryNotFound(id.to_string()))
    }

    /// Check whether a category exists.
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.categories.contains_key(id)
    }

    /// Iterate over all categories in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// The parent of a category, if it has one.
    pub fn parent_of(&self, id: &CategoryId) -> Option<&Category> {
        self.get(id)
            .and_then(|c| c.parent_id.as_ref())
            .and_then(|p| self.get(p))
    }

    /// Direct children of a category, ordered by name.
    pub fn children(&self, id: &CategoryId) -> Vec<&Category> {
        let mut children: Vec<&Category> = self
            .categories
            .values()
            .filter(|c| c.parent_id.as_ref() == Some(id))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Root categories, optionally limited to one country, ordered by name.
    pub fn roots(&self, country: Option<&CountryId>) -> Vec<&Category> {
        let mut roots: Vec<&Category> = self
            .categories
            .values()
            .filter(|c| c.is_root())
            .filter(|c| country.map_or(true, |country| &c.country_id == country))
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        roots
    }

    /// Ancestors of a category, optionally including the category itself.
    pub fn ancestor_chain(
        &self,
        id: &CategoryId,
        include_self: bool,
    ) -> Result<BTreeSet<CategoryId>, CatalogError> {
        let category = self.require(id)?;
        let mut chain = category.ancestors.clone();
        if include_self {
            chain.insert(category.id.clone());
        }
        Ok(chain)
    }

    /// Ancestors ordered from the root down, followed by the category itself.
    pub fn breadcrumb(&self, id: &CategoryId) -> Result<Vec<&Category>, CatalogError> {
        let category = self.require(id)?;
        let mut path = category
            .ancestors
            .iter()
            .map(|a| self.require(a))
            .collect::<Result<Vec<_>, _>>()?;
        path.sort_by_key(|c| c.level);
        path.push(category);
        Ok(path)
    }

    /// The category and all of its descendants.
    pub fn subtree(&self, id: &CategoryId) -> Result<BTreeSet<CategoryId>, CatalogError> {
        let category = self.require(id)?;
        let mut members = category.descendants.clone();
        members.insert(category.id.clone());
        Ok(members)
    }

    /// Check whether `category` is `root` or lies below it.
    ///
    /// Unknown categories are never inside any subtree.
    pub fn is_in_subtree(&self, category: &CategoryId, root: &CategoryId) -> bool {
        self.get(category).map_or(false, |c| c.is_within(root))
    }

    /// Check whether ads may be filed under a category (it has no descendants).
    pub fn is_selectable(&self, id: &CategoryId) -> Result<bool, CatalogError> {
        Ok(self.require(id)?.is_selectable())
    }

    /// Create a category, optionally under a parent.
    ///
    /// The new category inherits `ancestors(parent) ∪ {parent}` and sits one
    /// level below the parent. It is then registered in the `descendants` of
    /// each of its ancestors.
    pub fn create_category(&mut self, new: NewCategory) -> Result<Category, CatalogError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CatalogError::ValidationError(
                "category name must not be empty".to_string(),
            ));
        }

        let id = new.id.unwrap_or_else(CategoryId::generate);
        if self.contains(&id) {
            return Err(CatalogError::ValidationError(format!(
                "category {} already exists",
                id
            )));
        }

        let (ancestors, level) = self.closure_under(new.parent_id.as_ref())?;
        self.ensure_unique_name(new.parent_id.as_ref(), &new.country_id, name, None)?;

        let category = Category {
            id: id.clone(),
            name: name.to_string(),
            level,
            country_id: new.country_id,
            status: Status::Active,
            parent_id: new.parent_id.clone(),
            form_id: new.form_id,
            ancestors,
            descendants: BTreeSet::new(),
            created_at: current_timestamp(),
            updated_at: None,
        };

        for ancestor_id in &category.ancestors {
            if let Some(ancestor) = self.categories.get_mut(ancestor_id) {
                ancestor.descendants.insert(id.clone());
                self.dirty.insert(ancestor_id.clone());
            }
        }

        self.categories.insert(id.clone(), category.clone());
        self.dirty.insert(id.clone());
        self.pending.push(TreeEvent::CategoryCreated {
            category_id: id,
            parent_id: new.parent_id,
        });

        Ok(category)
    }

    /// Move a category (with its whole subtree) under a new parent.
    ///
    /// The category's ancestors are recomputed from the new parent exactly as
    /// on creation. The moved subtree is removed from the `descendants` of the
    /// old ancestors and added to those of the new ones, and every member of
    /// the subtree gets its ancestors and level re-derived.
    ///
    /// Fails with [`CatalogError::InvalidReparent`] if the new parent is the
    /// category itself or one of its descendants.
    pub fn set_parent(
        &mut self,
        id: &CategoryId,
        new_parent: Option<&CategoryId>,
    ) -> Result<(), CatalogError> {
        let category = self.require(id)?;
        let old_parent = category.parent_id.clone();
        let old_ancestors = category.ancestors.clone();

        if let Some(parent_id) = new_parent {
            let parent = self.require(parent_id)?;
            if parent_id == id || parent.ancestors.contains(id) {
                return Err(CatalogError::InvalidReparent {
                    category: id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
        }
        if old_parent.as_ref() != new_parent {
            self.ensure_unique_name(new_parent, &category.country_id, &category.name, Some(id))?;
        }

        // Plan the new closure for the subtree, parents before children.
        let mut members: Vec<&Category> = category
            .descendants
            .iter()
            .map(|d| self.require(d))
            .collect::<Result<_, _>>()?;
        members.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.id.cmp(&b.id)));

        let mut planned: HashMap<CategoryId, (BTreeSet<CategoryId>, i32)> = HashMap::new();
        planned.insert(id.clone(), self.closure_under(new_parent)?);
        for member in &members {
            let parent_id = member.parent_id.as_ref().ok_or_else(|| {
                CatalogError::ValidationError(format!("descendant {} has no parent", member.id))
            })?;
            let (parent_ancestors, parent_level) = planned.get(parent_id).ok_or_else(|| {
                CatalogError::ValidationError(format!(
                    "closure of {} is out of sync with its parent links",
                    id
                ))
            })?;
            let mut ancestors = parent_ancestors.clone();
            ancestors.insert(parent_id.clone());
            let level = parent_level + 1;
            planned.insert(member.id.clone(), (ancestors, level));
        }

        let subtree: BTreeSet<CategoryId> = planned.keys().cloned().collect();
        let new_ancestors = planned
            .get(id)
            .map(|(ancestors, _)| ancestors.clone())
            .unwrap_or_default();
        let now = current_timestamp();

        for ancestor_id in &old_ancestors {
            if let Some(ancestor) = self.categories.get_mut(ancestor_id) {
                ancestor.descendants.retain(|d| !subtree.contains(d));
                self.dirty.insert(ancestor_id.clone());
            }
        }

        for (member_id, (ancestors, level)) in planned {
            if let Some(member) = self.categories.get_mut(&member_id) {
                member.ancestors = ancestors;
                member.level = level;
                if &member_id == id {
                    member.parent_id = new_parent.cloned();
                    member.updated_at = Some(now);
                }
                self.dirty.insert(member_id);
            }
        }

        for ancestor_id in &new_ancestors {
            if let Some(ancestor) = self.categories.get_mut(ancestor_id) {
                ancestor.descendants.extend(subtree.iter().cloned());
                self.dirty.insert(ancestor_id.clone());
            }
        }

        self.pending.push(TreeEvent::CategoryReparented {
            category_id: id.clone(),
            old_parent_id: old_parent,
            new_parent_id: new_parent.cloned(),
        });

        Ok(())
    }

    /// Drain the IDs of categories changed since the last call.
    pub fn take_dirty(&mut self) -> BTreeSet<CategoryId> {
        std::mem::take(&mut self.dirty)
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Check every closure invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let broken = |msg: String| Err(CatalogError::ValidationError(msg));

        for category in self.categories.values() {
            if category.ancestors.contains(&category.id) {
                return broken(format!("{} is its own ancestor", category.id));
            }

            let (expected, level) = match self.closure_under(category.parent_id.as_ref()) {
                Ok(closure) => closure,
                Err(_) => return broken(format!("{} has an unknown parent", category.id)),
            };
            if category.ancestors != expected {
                return broken(format!("{} has stale ancestors", category.id));
            }
            if category.level != level {
                return broken(format!(
                    "{} is at level {}, expected {}",
                    category.id, category.level, level
                ));
            }

            for ancestor_id in &category.ancestors {
                let listed = self
                    .get(ancestor_id)
                    .map_or(false, |a| a.descendants.contains(&category.id));
                if !listed {
                    return broken(format!(
                        "{} is missing from the descendants of {}",
                        category.id, ancestor_id
                    ));
                }
            }

            for descendant_id in &category.descendants {
                let below = self
                    .get(descendant_id)
                    .map_or(false, |d| d.ancestors.contains(&category.id));
                if !below {
                    return broken(format!(
                        "{} lists {} as a descendant but is not its ancestor",
                        category.id, descendant_id
                    ));
                }
            }
        }

        Ok(())
    }

    /// Ancestors and level a category gets under the given parent.
    fn closure_under(
        &self,
        parent: Option<&CategoryId>,
    ) -> Result<(BTreeSet<CategoryId>, i32), CatalogError> {
        match parent {
            Some(parent_id) => {
                let parent = self.require(parent_id)?;
                let mut ancestors = parent.ancestors.clone();
                ancestors.insert(parent_id.clone());
                Ok((ancestors, parent.level + 1))
            }
            None => Ok((BTreeSet::new(), 1)),
        }
    }

    fn ensure_unique_name(
        &self,
        parent: Option<&CategoryId>,
        country: &CountryId,
        name: &str,
        except: Option<&CategoryId>,
    ) -> Result<(), CatalogError> {
        let taken = self.categories.values().any(|c| {
            c.parent_id.as_ref() == parent
                && &c.country_id == country
                && c.name == name
                && Some(&c.id) != except
        });
        if taken {
            return Err(CatalogError::DuplicateCategoryName {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
