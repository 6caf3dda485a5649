//! Crafttree Core -- recipe dependency analysis for crafting systems.
//!
//! This crate models crafting recipes as a dependency graph over base
//! materials and craftable items, and answers two questions about a target
//! item: how much of each base material one unit of it consumes, and whether
//! its material balance admits more than one consistent assignment (a
//! "resource exploit").
//!
//! # Pipeline
//!
//! 1. **Register** -- base materials and craftables are inserted into a
//!    [`registry::Registry`]. Every ingredient must already be registered, so
//!    the recipe graph stays acyclic.
//! 2. **Expand** -- [`expand::expand`] discovers a target's recipe graph
//!    depth-first, expanding each craftable once, folds exact quantity
//!    multipliers down it in topological order, and feeds an
//!    [`expand::ExpansionVisitor`].
//! 3. **Analyse** -- the visitor decides what the walk produces:
//!    - [`graph_view::build_dependency_graph`] records structure only,
//!    - [`aggregate::total_requirements`] sums multipliers per base material,
//!    - [`exploit::detect_exploit`] builds a balance equation and classifies
//!      it with exact rational arithmetic ([`linear`]).
//!
//! ```rust,ignore
//! let mut registry = Registry::new();
//! registry.add_base_material("ore")?;
//! registry.add_craftable("Ingot", "ore:1")?;
//! registry.add_craftable("Tool", "Ingot:2, ore:1")?;
//! let totals = total_requirements(&registry, "Tool")?;
//! assert_eq!(totals["ore"], BigUint::from(3u32));
//! ```
//!
//! # Key Types
//!
//! - [`registry::Registry`] -- owned, injectable store of items and recipes.
//! - [`id::ItemId`] -- interned item identifier.
//! - [`linear::LinearSystem`] -- exact linear system over `BigRational`.
//! - [`exploit::ExploitVerdict`] -- `NoExploit` or `ExploitDetected`.
//! - [`error::CraftError`] -- every failure the core can report.

pub mod aggregate;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod error;
pub mod expand;
pub mod exploit;
pub mod graph_view;
pub mod id;
pub mod linear;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::total_requirements;
pub use error::CraftError;
pub use exploit::{ExploitReport, ExploitVerdict, detect_exploit};
pub use graph_view::{DependencyGraph, build_dependency_graph};
pub use registry::{Limits, Registry};
