//! Trait catalog: the XP curve and the level-to-title table.
//!
//! Pure, stateless lookups over static tables. The five trait keys and
//! their display labels live on [`TraitKey`](calma_types::TraitKey) so that
//! every component consumes the same enumeration.
//!
//! # XP Curve
//!
//! XP required to finish level N is `floor(100 + N^1.5 * 40)`, a strictly
//! increasing, accelerating curve: level 1 costs 140 XP, level 2 costs 213,
//! level 10 costs 1364. At [`MAX_TRAIT_LEVEL`] the threshold is unreachable
//! and [`required_xp`] returns `None`.
//!
//! The curve is evaluated exactly in integer arithmetic:
//! `floor(N^1.5 * 40) = floor(sqrt(N^3 * 1600))`, so
//! `required_xp(N) = 100 + isqrt(1600 * N^3)` with no floating-point
//! involved.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum level a trait can reach. Beyond this the XP threshold is
/// infinite and further awards have no effect.
pub const MAX_TRAIT_LEVEL: u32 = 50;

/// Title for users below the lowest title threshold, and the title of a
/// freshly created record.
pub const DEFAULT_TITLE: &str = "The Beginner";

/// Total-level thresholds to titles, highest first. The highest threshold
/// less than or equal to the total level wins.
const TITLE_THRESHOLDS: [(u32, &str); 7] = [
    (50, "Master of Flow"),
    (40, "Calm Operator"),
    (30, "Architect"),
    (20, "Deep Worker"),
    (15, "Steady Climber"),
    (10, "Focused Builder"),
    (5, "The Beginner"),
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// XP required to finish the given level, or `None` at or beyond
/// [`MAX_TRAIT_LEVEL`] (the threshold is unreachable).
///
/// `required_xp(1)` is 140; the curve accelerates from there.
pub fn required_xp(level: u32) -> Option<u32> {
    if level >= MAX_TRAIT_LEVEL {
        return None;
    }
    // floor(level^1.5 * 40) computed exactly as isqrt(1600 * level^3).
    let cubed = u64::from(level).checked_pow(3)?;
    let scaled = cubed.checked_mul(1600)?;
    let curve = scaled.isqrt().checked_add(100)?;
    u32::try_from(curve).ok()
}

/// Title for the given total level: the highest threshold less than or
/// equal to it, or [`DEFAULT_TITLE`] below the lowest threshold.
pub fn title_for(total_level: u32) -> &'static str {
    TITLE_THRESHOLDS
        .iter()
        .find(|&&(threshold, _)| total_level >= threshold)
        .map_or(DEFAULT_TITLE, |&(_, title)| title)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
