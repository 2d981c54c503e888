//! Archetype resolver: maps the two highest-leveled traits to a label.
//!
//! All `C(5,2) = 10` trait pairs are covered by the table, so the default
//! label is unreachable in practice; the lookup is still total. Pair order
//! never matters: pairs are normalized to canonical key order before lookup.
//!
//! # Tie-breaking
//!
//! When two traits share a level, ranking falls back to canonical (lexical)
//! key order ascending. This makes the resolved archetype deterministic
//! regardless of how the trait map happens to be ordered.

use std::collections::BTreeMap;

use calma_types::{TraitKey, TraitState};

/// Label returned when the trait pair has no mapping.
pub const DEFAULT_ARCHETYPE: &str = "The Beginner";

/// Canonical trait pairs (in key order) to archetype names.
const ARCHETYPES: [((TraitKey, TraitKey), &str); 10] = [
    ((TraitKey::Attention, TraitKey::Awareness), "The Mindful Observer"),
    ((TraitKey::Attention, TraitKey::Consistency), "The Steady Focus"),
    ((TraitKey::Attention, TraitKey::Learning), "The Scholar"),
    ((TraitKey::Attention, TraitKey::Momentum), "The Driven Learner"),
    ((TraitKey::Awareness, TraitKey::Consistency), "The Reflective Builder"),
    ((TraitKey::Awareness, TraitKey::Learning), "The Thoughtful Explorer"),
    ((TraitKey::Awareness, TraitKey::Momentum), "The Sprinter"),
    ((TraitKey::Consistency, TraitKey::Learning), "The Diligent Student"),
    ((TraitKey::Consistency, TraitKey::Momentum), "The Architect"),
    ((TraitKey::Learning, TraitKey::Momentum), "The Quick Learner"),
];

/// Resolve the archetype for a full trait set.
///
/// Ranks the five traits by level descending (ties broken by canonical key
/// order ascending), takes the top two, normalizes the pair, and looks it
/// up in the archetype table.
pub fn archetype_for(traits: &BTreeMap<TraitKey, TraitState>) -> &'static str {
    let mut ranked: Vec<(TraitKey, u32)> = TraitKey::ALL
        .iter()
        .map(|&key| (key, traits.get(&key).map_or(1, |state| state.level)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut top = ranked.into_iter().map(|(key, _)| key);
    let (Some(first), Some(second)) = (top.next(), top.next()) else {
        return DEFAULT_ARCHETYPE;
    };
    let pair = if first <= second { (first, second) } else { (second, first) };

    ARCHETYPES
        .iter()
        .find(|&&(candidate, _)| candidate == pair)
        .map_or(DEFAULT_ARCHETYPE, |&(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trait_map(levels: &[(TraitKey, u32)]) -> BTreeMap<TraitKey, TraitState> {
        let mut map = BTreeMap::new();
        for key in TraitKey::ALL {
            map.insert(key, TraitState::new());
        }
        for &(key, level) in levels {
            map.insert(key, TraitState { level, xp: 0 });
        }
        map
    }

    #[test]
    fn consistency_and_momentum_is_the_architect() {
        let traits = trait_map(&[(TraitKey::Consistency, 10), (TraitKey::Momentum, 8)]);
        assert_eq!(archetype_for(&traits), "The Architect");
    }

    #[test]
    fn pair_order_does_not_matter() {
        let a = trait_map(&[(TraitKey::Momentum, 12), (TraitKey::Consistency, 3)]);
        let b = trait_map(&[(TraitKey::Consistency, 12), (TraitKey::Momentum, 3)]);
        assert_eq!(archetype_for(&a), archetype_for(&b));
        assert_eq!(archetype_for(&a), "The Architect");
    }

    #[test]
    fn all_level_ties_resolve_lexically() {
        // All traits at level 1: the top two are attention and awareness
        // by canonical key order.
        let traits = trait_map(&[]);
        assert_eq!(archetype_for(&traits), "The Mindful Observer");
    }

    #[test]
    fn partial_tie_resolves_lexically() {
        // Learning leads; consistency and momentum tie for second, and
        // consistency wins the tie lexically.
        let traits = trait_map(&[
            (TraitKey::Learning, 9),
            (TraitKey::Consistency, 4),
            (TraitKey::Momentum, 4),
        ]);
        assert_eq!(archetype_for(&traits), "The Diligent Student");
    }

    #[test]
    fn every_pair_has_a_mapping() {
        for (i, &first) in TraitKey::ALL.iter().enumerate() {
            for &second in TraitKey::ALL.iter().skip(i.saturating_add(1)) {
                let traits = trait_map(&[(first, 20), (second, 15)]);
                assert_ne!(
                    archetype_for(&traits),
                    DEFAULT_ARCHETYPE,
                    "missing mapping for ({first}, {second})"
                );
            }
        }
    }

    #[test]
    fn missing_keys_default_to_level_1() {
        let traits = BTreeMap::new();
        assert_eq!(archetype_for(&traits), "The Mindful Observer");
    }
}
