//! # Statistic Catalog
//!
//! The closed set of statistic keys the bridge recognizes. Everything that
//! flows into the record store is gated through this catalog: a value for a
//! key outside this set is discarded, whatever its source. The declaration
//! order below is the order in which query responses enumerate a player's
//! statistics, so it must stay stable across releases.

use std::collections::HashSet;
use std::sync::OnceLock;

/// All recognized statistic keys, in the stable order used for query output.
///
/// These are the game's namespaced custom-statistic names as they appear in
/// the per-player statistics artifacts under `stats.<namespace>.<key>`.
pub const STAT_ENTRIES: &[&str] = &[
    // Combat
    "minecraft:deaths",
    "minecraft:player_kills",
    "minecraft:mob_kills",
    "minecraft:damage_dealt",
    "minecraft:damage_taken",
    "minecraft:damage_absorbed",
    "minecraft:damage_blocked_by_shield",
    "minecraft:raid_trigger",
    "minecraft:raid_win",
    "minecraft:target_hit",
    // Movement distances (centimeters)
    "minecraft:walk_one_cm",
    "minecraft:sprint_one_cm",
    "minecraft:crouch_one_cm",
    "minecraft:swim_one_cm",
    "minecraft:fly_one_cm",
    "minecraft:aviate_one_cm",
    "minecraft:climb_one_cm",
    "minecraft:fall_one_cm",
    "minecraft:boat_one_cm",
    "minecraft:horse_one_cm",
    "minecraft:minecart_one_cm",
    // Interaction
    "minecraft:open_chest",
    "minecraft:open_enderchest",
    "minecraft:open_barrel",
    "minecraft:open_shulker_box",
    "minecraft:interact_with_crafting_table",
    "minecraft:interact_with_furnace",
    "minecraft:interact_with_anvil",
    "minecraft:enchant_item",
    "minecraft:talked_to_villager",
    "minecraft:traded_with_villager",
    "minecraft:animals_bred",
    "minecraft:fish_caught",
    "minecraft:bell_ring",
    // Misc counters and timers (game ticks)
    "minecraft:jump",
    "minecraft:drop",
    "minecraft:sleep_in_bed",
    "minecraft:leave_game",
    "minecraft:play_time",
    "minecraft:sneak_time",
    "minecraft:time_since_death",
    "minecraft:time_since_rest",
    "minecraft:total_world_time",
];

fn known_set() -> &'static HashSet<&'static str> {
    static KNOWN: OnceLock<HashSet<&'static str>> = OnceLock::new();
    KNOWN.get_or_init(|| STAT_ENTRIES.iter().copied().collect())
}

/// Whether `key` belongs to the catalog.
pub fn is_known(key: &str) -> bool {
    known_set().contains(key)
}

/// Resolves `key` to its canonical `&'static str` form, or `None` if it is
/// not in the catalog. Lets the store index records by static keys instead
/// of owned strings.
pub fn canonical(key: &str) -> Option<&'static str> {
    known_set().get(key).copied()
}

/// The full catalog in stable declaration order.
pub fn all() -> &'static [&'static str] {
    STAT_ENTRIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_are_recognized() {
        assert!(is_known("minecraft:deaths"));
        assert!(is_known("minecraft:play_time"));
        assert!(!is_known("minecraft:no_such_stat"));
        assert!(!is_known(""));
    }

    #[test]
    fn test_canonical_returns_static_entry() {
        let key = canonical("minecraft:jump").expect("catalog entry");
        assert_eq!(key, "minecraft:jump");
        assert!(canonical("jump").is_none());
    }

    #[test]
    fn test_catalog_order_is_stable_and_duplicate_free() {
        assert_eq!(all().len(), known_set().len());
        // Query output depends on the first entries staying put.
        assert_eq!(all()[0], "minecraft:deaths");
    }
}
