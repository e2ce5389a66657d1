//! Symbolic target resolution against a world-state snapshot.
//!
//! Resolution order, first match wins:
//!
//! 1. The reference is a literal zone key present in `zones`.
//! 2. The reference matches the free-text pattern `"zone N"` (case
//!    insensitive, separators optional) and key `N` exists.
//! 3. The reference matches a zone key after canonicalization (lowercase,
//!    non-alphanumerics stripped) – lets `"Zone_1"`-style operator names
//!    find their zone.
//! 4. The reference is a known object id with a recorded pose; objects
//!    carry a fixed default tolerance rather than a configured one.
//!
//! Zones deliberately outrank objects: an object id that looks like a
//! number resolves to the zone, not the object.  This tie-break is part of
//! the contract, not an accident of ordering.

use std::sync::LazyLock;

use gantry_types::{GantryError, ResolvedTarget, TargetKind, WorldState, Zone};
use regex::Regex;

/// Placement tolerance applied when the target is an object; objects do not
/// carry a configured tolerance the way zones do.
pub const DEFAULT_OBJECT_TOLERANCE_M: f64 = 0.03;

/// `"zone 1"`, `"Zone_2"`, `" 3 "`, … – an optional `zone` prefix followed
/// by the numeric key.
static ZONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:zone[\s_-]*)?(\d+)\s*$").expect("static pattern"));

fn canonicalize(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn zone_target(key: &str, zone: &Zone) -> ResolvedTarget {
    ResolvedTarget {
        pose: zone.center_pose,
        tolerance_m: zone.tolerance_m,
        kind: TargetKind::Zone(key.to_string()),
    }
}

/// Resolve `reference` against `world`.
///
/// # Errors
///
/// [`GantryError::Resolution`] when nothing matches, or when the matched
/// object has no recorded pose (an unplaced object cannot be a target).
pub fn resolve(reference: &str, world: &WorldState) -> Result<ResolvedTarget, GantryError> {
    if let Some(zone) = world.zones.get(reference) {
        return Ok(zone_target(reference, zone));
    }

    if let Some(caps) = ZONE_PATTERN.captures(reference) {
        let key = &caps[1];
        if let Some(zone) = world.zones.get(key) {
            return Ok(zone_target(key, zone));
        }
    }

    let canon = canonicalize(reference);
    if !canon.is_empty() {
        for (key, zone) in &world.zones {
            if canonicalize(key) == canon {
                return Ok(zone_target(key, zone));
            }
        }
    }

    if let Some(record) = world.objects.get(reference) {
        return match record.pose {
            Some(pose) => Ok(ResolvedTarget {
                pose,
                tolerance_m: DEFAULT_OBJECT_TOLERANCE_M,
                kind: TargetKind::Object(reference.to_string()),
            }),
            None => Err(GantryError::Resolution(format!(
                "object '{reference}' has no recorded pose"
            ))),
        };
    }

    Err(GantryError::Resolution(reference.to_string()))
}
