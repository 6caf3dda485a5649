//! Total base-material requirements for one unit of a target.

use crate::error::CraftError;
use crate::expand::{MultiplierSum, expand};
use crate::registry::Registry;
use num_bigint::BigUint;
use std::collections::BTreeMap;
use tracing::debug;

/// How much of each base material one unit of `target` consumes.
///
/// A material reached through several recipe paths (a diamond dependency)
/// is counted once per path, each time with that path's multiplier. Totals
/// are exact at any size.
pub fn total_requirements(
    registry: &Registry,
    target: &str,
) -> Result<BTreeMap<String, BigUint>, CraftError> {
    let mut sum = MultiplierSum::default();
    expand(registry, target, &mut sum)?;
    let totals = sum.into_named(registry);
    debug!(item = target, materials = totals.len(), "computed total requirements");
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use std::time::{Duration, Instant};

    #[test]
    fn diamond_counts_both_paths() {
        let r = diamond_registry();
        let totals = total_requirements(&r, "Tool").unwrap();
        assert_eq!(totals, BTreeMap::from([("ore".to_string(), BigUint::from(3u32))]));
    }

    #[test]
    fn gear_needs_each_ingredient() {
        let r = workshop_registry();
        let totals = total_requirements(&r, "Gear").unwrap();
        assert_eq!(totals["wood"], BigUint::from(2u32));
        assert_eq!(totals["iron"], BigUint::from(1u32));
    }

    #[test]
    fn nested_multipliers() {
        let mut r = workshop_registry();
        r.add_craftable("Cart", "Gear:4, Plank:6").unwrap();
        let totals = total_requirements(&r, "Cart").unwrap();
        assert_eq!(totals["wood"], BigUint::from(4u32 * 2 + 6));
        assert_eq!(totals["iron"], BigUint::from(4u32));
    }

    #[test]
    fn totals_beyond_u64() {
        let mut r = registry_with_bases(&["ore"]);
        r.add_craftable("a", &format!("ore:{}", u32::MAX)).unwrap();
        r.add_craftable("b", &format!("a:{}", u32::MAX)).unwrap();
        r.add_craftable("c", &format!("b:{}", u32::MAX)).unwrap();
        let totals = total_requirements(&r, "c").unwrap();
        assert_eq!(
            totals["ore"].to_string(),
            "79228162458924105385300197375"
        );
    }

    #[test]
    fn stacked_diamonds_are_linear() {
        let r = stacked_diamonds(64);
        let started = Instant::now();
        let totals = total_requirements(&r, "A64").unwrap();
        assert_eq!(totals["ore"], BigUint::from(1u8) << 64usize);
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn unknown_target_rejected() {
        let r = workshop_registry();
        assert_eq!(
            total_requirements(&r, "Nonexistent"),
            Err(CraftError::InvalidTarget("Nonexistent".into()))
        );
    }

    #[test]
    fn base_material_is_not_a_target() {
        let r = workshop_registry();
        assert!(matches!(
            total_requirements(&r, "wood"),
            Err(CraftError::InvalidTarget(_))
        ));
    }
}
