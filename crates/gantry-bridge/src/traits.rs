//! The [`MotionBridge`] trait and the types that cross it.
//!
//! A bridge executes a **validated** action against a **resolved** target:
//! target resolution and safety gating have already happened upstream by
//! the time `execute` is called.  The bridge owns only session state (held
//! object, effective speed, last action); it never persists world state –
//! that is the dispatcher's job through the config store.

use async_trait::async_trait;
use gantry_types::{GantryError, Pose, ResolvedTarget};
use serde::{Deserialize, Serialize};

/// A motion the dispatcher asks the bridge to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum MotionAction {
    /// Travel to the object and grasp it.
    Pick { object_id: String, grip_strength: f64 },
    /// Travel to the target and release whatever is held.
    Place,
}

/// Observable session phase.  A hardware bridge reports `Moving` while a
/// trajectory is in flight; the mock's motions complete synchronously, so
/// it only ever reports `Idle` between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Idle,
    Moving,
}

/// Outcome of a successful bridge call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionResult {
    /// Where the end effector ended up.  For `stop` this is the pose at
    /// the moment of the stop.
    pub achieved_pose: Pose,
    /// Set by `Place`: the object that was released at the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_object: Option<String>,
}

/// Snapshot of the bridge session, shaped for the `query_status` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub phase: MotionPhase,
    pub held_object: Option<String>,
    pub speed_scale: f64,
    /// True between a `stop` and the next accepted motion.
    pub stopped: bool,
    pub last_action: String,
}

/// Capability set every motion backend must provide.
///
/// A future hardware implementation must bound its own blocking with a
/// timeout and surface `GantryError::Motion("timeout")` rather than hang
/// the dispatcher; nothing here may block indefinitely.
#[async_trait]
pub trait MotionBridge: Send + Sync {
    /// Execute a validated action against a resolved target.
    ///
    /// # Errors
    ///
    /// [`GantryError::Motion`] for semantically invalid transitions (e.g.
    /// placing with nothing held) or backend faults.
    async fn execute(
        &self,
        action: MotionAction,
        target: &ResolvedTarget,
    ) -> Result<MotionResult, GantryError>;

    /// Halt all motion immediately.  Unconditionally accepted: this is the
    /// one call that bypasses safety gating, and it must not fail for
    /// state-machine reasons.
    async fn stop(&self) -> Result<MotionResult, GantryError>;

    /// Set the session's effective speed scale.  Policy gating against the
    /// configured maximum happens upstream; the bridge only rejects shapes
    /// it cannot drive at all (outside `(0, 1]`).
    async fn set_speed(&self, scale: f64) -> Result<(), GantryError>;

    /// Current session snapshot.
    async fn status(&self) -> BridgeStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_action_uses_tagged_envelope() {
        let action = MotionAction::Pick {
            object_id: "red_cube".to_string(),
            grip_strength: 0.6,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"action\":\"pick\""));
        let back: MotionAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn motion_result_omits_absent_placed_object() {
        let result = MotionResult {
            achieved_pose: Pose::new(0.1, 0.2, 0.05),
            placed_object: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("placed_object"));
    }

    #[test]
    fn bridge_status_roundtrips() {
        let status = BridgeStatus {
            phase: MotionPhase::Idle,
            held_object: Some("yellow_cube".to_string()),
            speed_scale: 0.3,
            stopped: false,
            last_action: "pick:yellow_cube".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: BridgeStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }
}
