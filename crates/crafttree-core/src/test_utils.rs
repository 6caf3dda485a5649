//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::registry::Registry;

/// A registry holding only the given base materials.
pub fn registry_with_bases(bases: &[&str]) -> Registry {
    let mut registry = Registry::new();
    for base in bases {
        registry
            .add_base_material(base)
            .expect("fixture base material");
    }
    registry
}

/// `ore`; `Ingot = {ore: 1}`; `Tool = {Ingot: 2, ore: 1}`.
pub fn diamond_registry() -> Registry {
    let mut registry = registry_with_bases(&["ore"]);
    registry.add_craftable("Ingot", "ore:1").expect("fixture Ingot");
    registry
        .add_craftable("Tool", "Ingot:2, ore:1")
        .expect("fixture Tool");
    registry
}

/// `wood`, `iron`; `Plank = {wood: 1}`; `Gear = {wood: 2, iron: 1}`.
pub fn workshop_registry() -> Registry {
    let mut registry = registry_with_bases(&["wood", "iron"]);
    registry.add_craftable("Plank", "wood:1").expect("fixture Plank");
    registry
        .add_craftable("Gear", "wood:2, iron:1")
        .expect("fixture Gear");
    registry
}

/// `ore` plus craftables `level1..=levelN`, each needing `quantity` of the
/// level below (`level1` needs `quantity` ore).
pub fn chain_registry(levels: usize, quantity: u32) -> Registry {
    let mut registry = registry_with_bases(&["ore"]);
    let mut below = "ore".to_string();
    for level in 1..=levels {
        let name = format!("level{level}");
        registry
            .add_craftable(&name, &format!("{below}:{quantity}"))
            .expect("fixture chain level");
        below = name;
    }
    registry
}

/// `levels` diamonds stacked on one another: `A0 = {ore: 1}` and, for each
/// level, `Bi = {A(i-1): 1}`, `Ci = {A(i-1): 1}`, `Ai = {Bi: 1, Ci: 1}`.
/// `A{levels}` needs `2^levels` ore over that many distinct paths.
pub fn stacked_diamonds(levels: usize) -> Registry {
    let mut registry = registry_with_bases(&["ore"]);
    registry.add_craftable("A0", "ore:1").expect("fixture A0");
    for level in 1..=levels {
        let below = format!("A{}", level - 1);
        for side in ["B", "C"] {
            registry
                .add_craftable(&format!("{side}{level}"), &format!("{below}:1"))
                .expect("fixture diamond side");
        }
        registry
            .add_craftable(
                &format!("A{level}"),
                &format!("B{level}:1, C{level}:1"),
            )
            .expect("fixture diamond top");
    }
    registry
}
