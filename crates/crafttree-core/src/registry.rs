//! The recipe registry: base materials, craftables, and their recipes.
//!
//! Names live in a single namespace. A name is either a base material or a
//! craftable, never both. Ingredients must be registered before a recipe can
//! reference them, so the recipe graph is acyclic by construction; the one
//! way to close a cycle (overwriting an existing craftable) is checked
//! explicitly.

use crate::error::CraftError;
use crate::id::ItemId;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// One ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub quantity: BigUint,
}

/// What kind of item a registry entry is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A leaf resource with no recipe.
    Base,
    /// An item produced from its recipe, in registration order.
    Craftable(Vec<RecipeEntry>),
}

/// An item definition in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDef {
    pub name: String,
    pub kind: ItemKind,
}

impl ItemDef {
    pub fn is_base(&self) -> bool {
        matches!(self.kind, ItemKind::Base)
    }

    /// The recipe, or `None` for a base material.
    pub fn recipe(&self) -> Option<&[RecipeEntry]> {
        match &self.kind {
            ItemKind::Base => None,
            ItemKind::Craftable(recipe) => Some(recipe),
        }
    }
}

/// Bounds applied to every recipe expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of nested recipes a walk may descend through.
    pub max_depth: usize,
    /// Maximum number of distinct items a single walk may reach.
    pub max_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_items: 100_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owned store of every registered item. Analyses borrow it immutably, so
/// independent registries can coexist (one per session, one per test).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    items: Vec<ItemDef>,
    name_to_id: HashMap<String, ItemId>,
    limits: Limits,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    // -- Registration API --

    /// Register a base material. Registering the same name twice is a no-op.
    pub fn add_base_material(&mut self, name: &str) -> Result<ItemId, CraftError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CraftError::invalid_input("base material name is empty"));
        }

        if let Some(id) = self.item_id(name) {
            return match self.items[id.index()].kind {
                ItemKind::Base => Ok(id),
                ItemKind::Craftable(_) => Err(CraftError::NameConflict {
                    name: name.to_string(),
                    existing: "craftable item",
                }),
            };
        }

        let id = self.push_item(name, ItemKind::Base);
        debug!(name, id = id.0, "registered base material");
        Ok(id)
    }

    /// Register (or overwrite) a craftable from a recipe spec such as
    /// `"wood:2, iron:1"`.
    ///
    /// The whole spec is parsed before any ingredient is resolved, so a
    /// syntax error is reported ahead of an unknown ingredient. On any error
    /// the registry is left exactly as it was.
    pub fn add_craftable(&mut self, name: &str, recipe_spec: &str) -> Result<ItemId, CraftError> {
        let pairs = parse_recipe_spec(recipe_spec)?;
        self.add_craftable_with(name, pairs)
    }

    /// Register (or overwrite) a craftable from already-split
    /// `(ingredient, quantity)` pairs. A repeated ingredient keeps its first
    /// position and its last quantity.
    pub fn add_craftable_with<I, S, Q>(
        &mut self,
        name: &str,
        ingredients: I,
    ) -> Result<ItemId, CraftError>
    where
        I: IntoIterator<Item = (S, Q)>,
        S: AsRef<str>,
        Q: Into<BigUint>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(CraftError::invalid_input("craftable name is empty"));
        }

        let existing = self.item_id(name);
        if let Some(id) = existing
            && self.items[id.index()].is_base()
        {
            return Err(CraftError::NameConflict {
                name: name.to_string(),
                existing: "base material",
            });
        }

        let mut recipe: Vec<RecipeEntry> = Vec::new();
        for (ingredient, quantity) in ingredients {
            let quantity: BigUint = quantity.into();
            let ingredient = ingredient.as_ref().trim();
            if ingredient.is_empty() {
                return Err(CraftError::invalid_input(format!(
                    "empty ingredient name in recipe for '{name}'"
                )));
            }
            if quantity.is_zero() {
                return Err(CraftError::invalid_input(format!(
                    "quantity of '{ingredient}' must be a positive integer"
                )));
            }
            let item = self
                .item_id(ingredient)
                .ok_or_else(|| CraftError::UnknownIngredient {
                    craftable: name.to_string(),
                    ingredient: ingredient.to_string(),
                })?;

            match recipe.iter_mut().find(|entry| entry.item == item) {
                Some(entry) => entry.quantity = quantity,
                None => recipe.push(RecipeEntry { item, quantity }),
            }
        }

        if recipe.is_empty() {
            return Err(CraftError::invalid_input(format!(
                "recipe for '{name}' is empty"
            )));
        }

        // Only an overwrite can close a cycle: a new name cannot already be
        // referenced by anything.
        if let Some(id) = existing {
            for entry in &recipe {
                if let Some(mut path) = self.find_path(entry.item, id) {
                    path.insert(0, id);
                    return Err(CraftError::CycleDetected {
                        path: path.iter().map(|&i| self.name(i).to_string()).collect(),
                    });
                }
            }
        }

        let id = match existing {
            Some(id) => {
                self.items[id.index()].kind = ItemKind::Craftable(recipe);
                debug!(name, id = id.0, "overwrote craftable recipe");
                id
            }
            None => {
                let id = self.push_item(name, ItemKind::Craftable(recipe));
                debug!(name, id = id.0, "registered craftable");
                id
            }
        };
        Ok(id)
    }

    fn push_item(&mut self, name: &str, kind: ItemKind) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(ItemDef {
            name: name.to_string(),
            kind,
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Path of ids from `from` down to `to` through recipes, if one exists.
    fn find_path(&self, from: ItemId, to: ItemId) -> Option<Vec<ItemId>> {
        let mut visited = HashSet::new();
        let mut stack = vec![(from, vec![from])];
        while let Some((item, path)) = stack.pop() {
            if item == to {
                return Some(path);
            }
            if !visited.insert(item) {
                continue;
            }
            if let Some(recipe) = self.items[item.index()].recipe() {
                for entry in recipe {
                    let mut next = path.clone();
                    next.push(entry.item);
                    stack.push((entry.item, next));
                }
            }
        }
        None
    }

    // -- Query API --

    /// Lookup an item id by (trimmed) name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name.trim()).copied()
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(id.index())
    }

    /// Name of a registered item. Ids are only minted by this registry, so
    /// a foreign id yields an empty string rather than a panic.
    pub fn name(&self, id: ItemId) -> &str {
        self.items
            .get(id.index())
            .map(|item| item.name.as_str())
            .unwrap_or("")
    }

    pub fn is_base(&self, name: &str) -> bool {
        self.item_id(name)
            .is_some_and(|id| self.items[id.index()].is_base())
    }

    pub fn is_craftable(&self, name: &str) -> bool {
        self.item_id(name)
            .is_some_and(|id| !self.items[id.index()].is_base())
    }

    /// Resolve an analysis target, which must be a registered craftable.
    pub fn craftable_id(&self, target: &str) -> Result<ItemId, CraftError> {
        match self.item_id(target) {
            Some(id) if !self.items[id.index()].is_base() => Ok(id),
            _ => Err(CraftError::InvalidTarget(target.trim().to_string())),
        }
    }

    /// The recipe of a craftable by name.
    pub fn recipe(&self, name: &str) -> Option<&[RecipeEntry]> {
        self.item_id(name)
            .and_then(|id| self.items[id.index()].recipe())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &ItemDef)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (ItemId(i as u32), item))
    }

    /// Replace a craftable's recipe without any validation, so traversal
    /// guards can be exercised against a registry that contains a cycle.
    #[cfg(test)]
    pub(crate) fn set_recipe_unchecked(&mut self, name: &str, spec: &str) {
        let recipe = parse_recipe_spec(spec)
            .expect("valid spec")
            .into_iter()
            .map(|(ingredient, quantity)| RecipeEntry {
                item: self.item_id(&ingredient).expect("known ingredient"),
                quantity,
            })
            .collect();
        let id = self.item_id(name).expect("known craftable");
        self.items[id.index()].kind = ItemKind::Craftable(recipe);
    }

    pub fn list_base_materials(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .filter(|item| item.is_base())
            .map(|item| item.name.clone())
            .collect()
    }

    pub fn list_craftables(&self) -> BTreeMap<String, BTreeMap<String, BigUint>> {
        self.items
            .iter()
            .filter_map(|item| {
                let recipe = item.recipe()?;
                let entries = recipe
                    .iter()
                    .map(|entry| (self.name(entry.item).to_string(), entry.quantity.clone()))
                    .collect();
                Some((item.name.clone(), entries))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Recipe spec parsing
// ---------------------------------------------------------------------------

/// Split a recipe spec like `"wood:2, iron:1"` into `(ingredient, quantity)`
/// pairs. Whitespace around every token is trimmed. Ingredient names are not
/// resolved here. Quantities may be any positive integer.
pub fn parse_recipe_spec(spec: &str) -> Result<Vec<(String, BigUint)>, CraftError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(CraftError::invalid_input("recipe is empty"));
    }

    spec.split(',').map(parse_pair).collect()
}

fn parse_pair(part: &str) -> Result<(String, BigUint), CraftError> {
    let (ingredient, quantity) = part.split_once(':').ok_or_else(|| {
        CraftError::invalid_input(format!(
            "expected 'ingredient:quantity', got '{}'",
            part.trim()
        ))
    })?;

    let ingredient = ingredient.trim();
    if ingredient.is_empty() {
        return Err(CraftError::invalid_input(format!(
            "missing ingredient name in '{}'",
            part.trim()
        )));
    }

    let quantity = quantity.trim();
    let value: BigInt = quantity.parse().map_err(|_| {
        CraftError::invalid_input(format!(
            "quantity '{quantity}' for '{ingredient}' is not an integer"
        ))
    })?;
    if value.sign() != Sign::Plus {
        return Err(CraftError::invalid_input(format!(
            "quantity of '{ingredient}' must be a positive integer, got {value}"
        )));
    }
    let (_, magnitude) = value.into_parts();

    Ok((ingredient.to_string(), magnitude))
}
