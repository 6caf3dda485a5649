//! Dependency expansion: the traversal shared by every analysis.
//!
//! [`expand`] resolves a target's recipe graph in three passes:
//!
//! 1. A depth-first discovery over an explicit work stack. Each craftable is
//!    expanded once, no matter how many recipes reach it, and its edges are
//!    reported to the visitor at that point.
//! 2. A pass in topological order that folds multipliers down the graph
//!    (`multiplier(ingredient) += multiplier(item) * quantity`) and tracks
//!    the longest path to every craftable.
//! 3. One [`ExpansionVisitor::leaf`] call per base material, in discovery
//!    order, carrying the material's summed multiplier.
//!
//! Work is linear in the number of reachable items and edges, so shared
//! sub-recipes (diamonds stacked on diamonds) cost nothing extra. Multipliers
//! are [`BigUint`] and never overflow.
//!
//! The shipped visitors:
//!
//! - [`StructureCollector`] records item -> ingredient edges, once each.
//! - [`MultiplierSum`] adds multipliers per base material.
//! - [`EquationBuilder`] builds the coefficients of one balance equation.
//!
//! Depth is bounded by [`Limits::max_depth`] and breadth by
//! [`Limits::max_items`]. A repeat on the active path fails with
//! [`CraftError::CycleDetected`] instead of looping.

use crate::error::CraftError;
use crate::id::ItemId;
use crate::registry::{ItemDef, Limits, RecipeEntry, Registry};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

// ---------------------------------------------------------------------------
// Visitor trait
// ---------------------------------------------------------------------------

/// Receives the events of a recipe expansion.
pub trait ExpansionVisitor {
    /// Called once per (item, ingredient) pair of every reachable craftable,
    /// in recipe order, when that craftable is first expanded.
    fn edge(&mut self, _parent: ItemId, _ingredient: ItemId) {}

    /// Called once per reachable base material with the sum, over every path
    /// from the target, of the product of quantities along that path.
    fn leaf(&mut self, base: ItemId, multiplier: &BigUint);
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    /// On the current discovery path.
    Active,
    Done,
}

struct Frame<'r> {
    item: ItemId,
    recipe: &'r [RecipeEntry],
    next: usize,
}

/// What discovery found below the target.
#[derive(Debug, Default)]
struct Reached {
    /// Base materials in the order they were first reached.
    bases: Vec<ItemId>,
    /// Craftables in depth-first postorder.
    postorder: Vec<ItemId>,
    items: usize,
}

/// Expand `target` with an initial multiplier of 1, feeding `visitor`.
/// Returns the target's id.
///
/// Fails with [`CraftError::InvalidTarget`] if `target` is not a registered
/// craftable.
pub fn expand<V>(registry: &Registry, target: &str, visitor: &mut V) -> Result<ItemId, CraftError>
where
    V: ExpansionVisitor + ?Sized,
{
    let root = registry.craftable_id(target)?;
    let limits = registry.limits();

    let reached = discover(registry, root, limits, visitor)?;
    let multipliers = propagate(registry, root, &reached, limits)?;

    for &base in &reached.bases {
        let multiplier = &multipliers[base.index()];
        trace!(base = registry.name(base), %multiplier, "reached base material");
        visitor.leaf(base, multiplier);
    }
    trace!(
        items = reached.items,
        craftables = reached.postorder.len(),
        "expansion finished"
    );

    Ok(root)
}

/// Depth-first discovery of everything reachable from `root`. Edges are
/// reported as each craftable is opened.
fn discover<'r, V>(
    registry: &'r Registry,
    root: ItemId,
    limits: Limits,
    visitor: &mut V,
) -> Result<Reached, CraftError>
where
    V: ExpansionVisitor + ?Sized,
{
    let mut marks = vec![Mark::Unseen; registry.item_count()];
    let mut reached = Reached::default();
    let mut stack: Vec<Frame<'r>> = Vec::new();
    let mut pending = Some(root);

    loop {
        if let Some(item) = pending.take() {
            reached.items += 1;
            if reached.items > limits.max_items {
                return Err(CraftError::SizeExceeded {
                    limit: limits.max_items,
                });
            }
            match registry.get(item).and_then(ItemDef::recipe) {
                Some(recipe) => {
                    marks[item.index()] = Mark::Active;
                    for entry in recipe {
                        visitor.edge(item, entry.item);
                    }
                    stack.push(Frame {
                        item,
                        recipe,
                        next: 0,
                    });
                }
                None => {
                    marks[item.index()] = Mark::Done;
                    reached.bases.push(item);
                }
            }
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        let recipe = frame.recipe;
        match recipe.get(frame.next) {
            Some(entry) => {
                frame.next += 1;
                match marks[entry.item.index()] {
                    Mark::Unseen => pending = Some(entry.item),
                    Mark::Done => {}
                    Mark::Active => {
                        let mut path: Vec<String> = stack
                            .iter()
                            .map(|frame| registry.name(frame.item).to_string())
                            .collect();
                        path.push(registry.name(entry.item).to_string());
                        return Err(CraftError::CycleDetected { path });
                    }
                }
            }
            None => {
                let item = frame.item;
                stack.pop();
                marks[item.index()] = Mark::Done;
                reached.postorder.push(item);
            }
        }
    }

    Ok(reached)
}

/// Fold multipliers and path lengths down the graph. Reverse postorder is a
/// topological order, so every craftable is final before it is pushed down.
fn propagate(
    registry: &Registry,
    root: ItemId,
    reached: &Reached,
    limits: Limits,
) -> Result<Vec<BigUint>, CraftError> {
    let mut multipliers = vec![BigUint::zero(); registry.item_count()];
    let mut depths = vec![0usize; registry.item_count()];
    multipliers[root.index()] = BigUint::one();

    for &item in reached.postorder.iter().rev() {
        let depth = depths[item.index()];
        if depth >= limits.max_depth {
            return Err(CraftError::DepthExceeded {
                limit: limits.max_depth,
            });
        }
        let Some(recipe) = registry.get(item).and_then(ItemDef::recipe) else {
            continue;
        };
        let multiplier = multipliers[item.index()].clone();
        for entry in recipe {
            let child = entry.item.index();
            multipliers[child] += &multiplier * &entry.quantity;
            depths[child] = depths[child].max(depth + 1);
        }
    }

    Ok(multipliers)
}

// ---------------------------------------------------------------------------
// Structure-only accumulator
// ---------------------------------------------------------------------------

/// Records the directed edges of the expansion, ignoring multipliers. An edge
/// reached through several paths is recorded once.
#[derive(Debug, Default)]
pub struct StructureCollector {
    nodes: Vec<ItemId>,
    seen_nodes: HashSet<ItemId>,
    edges: Vec<(ItemId, ItemId)>,
    seen_edges: HashSet<(ItemId, ItemId)>,
}

impl StructureCollector {
    /// A collector whose node list starts with `root`.
    pub fn rooted_at(root: ItemId) -> Self {
        let mut collector = Self::default();
        collector.add_node(root);
        collector
    }

    fn add_node(&mut self, id: ItemId) {
        if self.seen_nodes.insert(id) {
            self.nodes.push(id);
        }
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> &[ItemId] {
        &self.nodes
    }

    /// Edges in discovery order, without duplicates.
    pub fn edges(&self) -> &[(ItemId, ItemId)] {
        &self.edges
    }
}

impl ExpansionVisitor for StructureCollector {
    fn edge(&mut self, parent: ItemId, ingredient: ItemId) {
        self.add_node(parent);
        self.add_node(ingredient);
        if self.seen_edges.insert((parent, ingredient)) {
            self.edges.push((parent, ingredient));
        }
    }

    fn leaf(&mut self, _: ItemId, _: &BigUint) {}
}

// ---------------------------------------------------------------------------
// Multiplier-sum accumulator
// ---------------------------------------------------------------------------

/// Sums the multiplier of every base-material leaf, keyed by base material.
/// Feeding one collector several expansions adds their totals.
#[derive(Debug, Default)]
pub struct MultiplierSum {
    totals: HashMap<ItemId, BigUint>,
}

impl MultiplierSum {
    pub fn get(&self, base: ItemId) -> Option<&BigUint> {
        self.totals.get(&base)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Totals keyed by base-material name.
    pub fn into_named(self, registry: &Registry) -> BTreeMap<String, BigUint> {
        self.totals
            .into_iter()
            .map(|(id, total)| (registry.name(id).to_string(), total))
            .collect()
    }
}

impl ExpansionVisitor for MultiplierSum {
    fn leaf(&mut self, base: ItemId, multiplier: &BigUint) {
        *self.totals.entry(base).or_default() += multiplier;
    }
}

// ---------------------------------------------------------------------------
// Equation-build accumulator
// ---------------------------------------------------------------------------

/// Builds the left-hand side of a single linear equation: one term per
/// distinct base material, coefficient = sum of its multipliers. Terms keep
/// the order in which their variables were first reached.
#[derive(Debug, Default)]
pub struct EquationBuilder {
    terms: Vec<(ItemId, BigInt)>,
    positions: HashMap<ItemId, usize>,
}

impl EquationBuilder {
    pub fn into_terms(self) -> Vec<(ItemId, BigInt)> {
        self.terms
    }
}

impl ExpansionVisitor for EquationBuilder {
    fn leaf(&mut self, base: ItemId, multiplier: &BigUint) {
        let coefficient = BigInt::from(multiplier.clone());
        match self.positions.get(&base) {
            Some(&pos) => self.terms[pos].1 += coefficient,
            None => {
                self.positions.insert(base, self.terms.len());
                self.terms.push((base, coefficient));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn multiplier_sum_on_diamond() {
        let r = diamond_registry();
        let mut sum = MultiplierSum::default();
        expand(&r, "Tool", &mut sum).unwrap();
        let ore = r.item_id("ore").unwrap();
        assert_eq!(sum.get(ore), Some(&BigUint::from(3u32)));
        assert_eq!(sum.len(), 1);
    }

    #[test]
    fn multipliers_multiply_down_a_chain() {
        // Each level needs 2 of the level below.
        let r = chain_registry(5, 2);
        let mut sum = MultiplierSum::default();
        expand(&r, "level5", &mut sum).unwrap();
        assert_eq!(sum.get(r.item_id("ore").unwrap()), Some(&BigUint::from(32u32)));
    }

    #[test]
    fn structure_collector_dedups_edges() {
        let r = diamond_registry();
        let root = r.item_id("Tool").unwrap();
        let mut collector = StructureCollector::rooted_at(root);
        expand(&r, "Tool", &mut collector).unwrap();
        // Tool->Ingot, Tool->ore, Ingot->ore
        assert_eq!(collector.edges().len(), 3);
        assert_eq!(collector.nodes().len(), 3);
        assert_eq!(collector.nodes()[0], root);
    }

    #[test]
    fn structure_collector_records_shared_subtree_once() {
        let mut r = registry_with_bases(&["ore"]);
        r.add_craftable("Ingot", "ore:1").unwrap();
        r.add_craftable("Left", "Ingot:1").unwrap();
        r.add_craftable("Right", "Ingot:3").unwrap();
        r.add_craftable("Top", "Left:1, Right:1").unwrap();
        let mut collector = StructureCollector::default();
        expand(&r, "Top", &mut collector).unwrap();
        let ingot = r.item_id("Ingot").unwrap();
        let ore = r.item_id("ore").unwrap();
        let count = collector
            .edges()
            .iter()
            .filter(|&&edge| edge == (ingot, ore))
            .count();
        assert_eq!(count, 1);
        assert_eq!(collector.edges().len(), 5);
    }

    #[test]
    fn equation_builder_merges_paths() {
        let mut r = registry_with_bases(&["wood", "iron"]);
        r.add_craftable("Plank", "wood:2").unwrap();
        r.add_craftable("Crate", "Plank:3, iron:1, wood:1").unwrap();
        let mut eq = EquationBuilder::default();
        expand(&r, "Crate", &mut eq).unwrap();
        let terms = eq.into_terms();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0], (r.item_id("wood").unwrap(), BigInt::from(7)));
        assert_eq!(terms[1], (r.item_id("iron").unwrap(), BigInt::from(1)));
    }

    #[test]
    fn depth_limit_enforced() {
        let mut r = chain_registry(10, 1);
        r.set_limits(Limits {
            max_depth: 4,
            ..Limits::default()
        });
        let mut sum = MultiplierSum::default();
        let err = expand(&r, "level10", &mut sum).unwrap_err();
        assert_eq!(err, CraftError::DepthExceeded { limit: 4 });
        // A shallow target still fits.
        let mut sum = MultiplierSum::default();
        assert!(expand(&r, "level3", &mut sum).is_ok());
    }

    #[test]
    fn depth_counts_the_longest_path() {
        // Tool reaches Ingot directly and through Mold, so Ingot sits at
        // depth 2 even though it was first discovered at depth 1.
        let mut r = registry_with_bases(&["ore"]);
        r.add_craftable("Ingot", "ore:1").unwrap();
        r.add_craftable("Mold", "Ingot:1").unwrap();
        r.add_craftable("Tool", "Ingot:1, Mold:1").unwrap();
        r.set_limits(Limits {
            max_depth: 2,
            ..Limits::default()
        });
        let mut sum = MultiplierSum::default();
        assert_eq!(
            expand(&r, "Tool", &mut sum),
            Err(CraftError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn item_limit_enforced() {
        let mut r = chain_registry(10, 1);
        r.set_limits(Limits {
            max_items: 5,
            ..Limits::default()
        });
        let mut sum = MultiplierSum::default();
        assert_eq!(
            expand(&r, "level10", &mut sum),
            Err(CraftError::SizeExceeded { limit: 5 })
        );
        // level4..level1 plus ore is exactly five items.
        assert!(expand(&r, "level4", &mut sum).is_ok());
    }

    #[test]
    fn large_quantities_do_not_overflow() {
        let mut r = registry_with_bases(&["ore"]);
        r.add_craftable("a", &format!("ore:{}", u32::MAX)).unwrap();
        r.add_craftable("b", &format!("a:{}", u32::MAX)).unwrap();
        r.add_craftable("c", &format!("b:{}", u32::MAX)).unwrap();
        let mut sum = MultiplierSum::default();
        expand(&r, "c", &mut sum).unwrap();
        let expected = BigUint::from(u32::MAX).pow(3);
        assert_eq!(sum.get(r.item_id("ore").unwrap()), Some(&expected));
    }

    #[test]
    fn shared_subrecipes_are_expanded_once() {
        let r = stacked_diamonds(64);
        let mut edges = 0usize;
        struct CountEdges<'a>(&'a mut usize);
        impl ExpansionVisitor for CountEdges<'_> {
            fn edge(&mut self, _: ItemId, _: ItemId) {
                *self.0 += 1;
            }
            fn leaf(&mut self, _: ItemId, _: &BigUint) {}
        }
        expand(&r, "A64", &mut CountEdges(&mut edges)).unwrap();
        // A0 -> ore, then two edges into each B/C and two out of each A.
        assert_eq!(edges, 4 * 64 + 1);

        let mut sum = MultiplierSum::default();
        expand(&r, "A64", &mut sum).unwrap();
        assert_eq!(
            sum.get(r.item_id("ore").unwrap()),
            Some(&(BigUint::one() << 64usize))
        );
    }

    #[test]
    fn cycle_in_corrupted_registry_is_reported() {
        let mut r = registry_with_bases(&["ore"]);
        r.add_craftable("A", "ore:1").unwrap();
        r.add_craftable("B", "A:1").unwrap();
        r.set_recipe_unchecked("A", "B:1");
        let mut sum = MultiplierSum::default();
        assert_eq!(
            expand(&r, "B", &mut sum),
            Err(CraftError::CycleDetected {
                path: vec!["B".into(), "A".into(), "B".into()],
            })
        );
    }

    #[test]
    fn non_craftable_target_rejected() {
        let r = diamond_registry();
        let mut sum = MultiplierSum::default();
        assert_eq!(
            expand(&r, "ore", &mut sum),
            Err(CraftError::InvalidTarget("ore".into()))
        );
        assert!(sum.is_empty());
    }
}
