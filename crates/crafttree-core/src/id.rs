use serde::{Deserialize, Serialize};

/// Identifies an item (base material or craftable) in the registry.
/// Cheap to copy and compare. Ids are assigned in registration order and
/// stay stable when a craftable's recipe is overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_equality() {
        let a = ItemId(0);
        let b = ItemId(0);
        let c = ItemId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn item_ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ItemId(0), "wood");
        map.insert(ItemId(1), "iron");
        assert_eq!(map[&ItemId(1)], "iron");
    }

    #[test]
    fn index_matches_inner_value() {
        assert_eq!(ItemId(7).index(), 7);
    }
}
