//! [`MockBridge`] – simulated robot used for development without ROS 2.
//!
//! Motions are instantaneous and always achievable: `execute` returns the
//! resolved target's pose as the achieved pose.  The session state machine
//! is `Idle → Moving → Idle` with no observable intermediate state, so
//! callers only ever see `Idle`.  The one invalid transition is placing
//! with nothing held.  `stop` forces `Idle`, releases any held object, and
//! reports the pose at the time of the stop – for the mock, the last
//! achieved pose.

use async_trait::async_trait;
use gantry_types::{GantryError, Pose, ResolvedTarget};
use tokio::sync::Mutex;
use tracing::debug;

use crate::traits::{BridgeStatus, MotionAction, MotionBridge, MotionPhase, MotionResult};

/// Default session speed scale, matching the settings file default.
pub const DEFAULT_SPEED_SCALE: f64 = 0.3;

struct Session {
    held_object: Option<String>,
    current_pose: Pose,
    speed_scale: f64,
    stopped: bool,
    last_action: String,
}

/// In-process stand-in for a real manipulator driver.
///
/// # Example
///
/// ```
/// use gantry_bridge::{MockBridge, MotionAction, MotionBridge};
/// use gantry_types::{Pose, ResolvedTarget, TargetKind};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bridge = MockBridge::new();
/// let target = ResolvedTarget {
///     pose: Pose::new(0.35, 0.15, 0.05),
///     tolerance_m: 0.03,
///     kind: TargetKind::Object("red_cube".to_string()),
/// };
/// let result = bridge
///     .execute(
///         MotionAction::Pick { object_id: "red_cube".into(), grip_strength: 0.6 },
///         &target,
///     )
///     .await
///     .unwrap();
/// assert_eq!(result.achieved_pose, target.pose);
/// # }
/// ```
pub struct MockBridge {
    session: Mutex<Session>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::with_speed(DEFAULT_SPEED_SCALE)
    }

    /// Create a mock with a specific initial session speed.
    pub fn with_speed(speed_scale: f64) -> Self {
        Self {
            session: Mutex::new(Session {
                held_object: None,
                current_pose: Pose::new(0.0, 0.0, 0.0),
                speed_scale,
                stopped: false,
                last_action: "idle".to_string(),
            }),
        }
    }
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionBridge for MockBridge {
    async fn execute(
        &self,
        action: MotionAction,
        target: &ResolvedTarget,
    ) -> Result<MotionResult, GantryError> {
        let mut session = self.session.lock().await;
        // The Idle → Moving → Idle transition collapses to a single step
        // here: simulated travel is instantaneous.
        match action {
            MotionAction::Pick {
                object_id,
                grip_strength,
            } => {
                session.current_pose = target.pose;
                session.held_object = Some(object_id.clone());
                session.stopped = false;
                session.last_action = format!("pick:{object_id}");
                debug!(object_id, grip_strength, "mock pick complete");
                Ok(MotionResult {
                    achieved_pose: target.pose,
                    placed_object: None,
                })
            }
            MotionAction::Place => {
                let Some(placed) = session.held_object.take() else {
                    return Err(GantryError::Motion("no object held".to_string()));
                };
                session.current_pose = target.pose;
                session.stopped = false;
                session.last_action = format!("place:{placed}");
                debug!(object_id = %placed, "mock place complete");
                Ok(MotionResult {
                    achieved_pose: target.pose,
                    placed_object: Some(placed),
                })
            }
        }
    }

    async fn stop(&self) -> Result<MotionResult, GantryError> {
        let mut session = self.session.lock().await;
        session.held_object = None;
        session.stopped = true;
        session.last_action = "stop".to_string();
        debug!("mock stop");
        Ok(MotionResult {
            achieved_pose: session.current_pose,
            placed_object: None,
        })
    }

    async fn set_speed(&self, scale: f64) -> Result<(), GantryError> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(GantryError::Motion(format!(
                "speed scale {scale} outside (0, 1]"
            )));
        }
        let mut session = self.session.lock().await;
        session.speed_scale = scale;
        session.last_action = format!("set_speed:{scale:.2}");
        Ok(())
    }

    async fn status(&self) -> BridgeStatus {
        let session = self.session.lock().await;
        BridgeStatus {
            phase: MotionPhase::Idle,
            held_object: session.held_object.clone(),
            speed_scale: session.speed_scale,
            stopped: session.stopped,
            last_action: session.last_action.clone(),
        }
    }
}
