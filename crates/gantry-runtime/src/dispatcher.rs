//! [`ToolDispatcher`] – the orchestration core.
//!
//! One entry point, [`ToolDispatcher::dispatch`], receives a parsed
//! [`ToolCall`] and runs the per-tool pipeline.  For the mutating tools
//! (`pick`, `place`, `move_object`) the pipeline is strict and ordered:
//!
//! 1. take a world-state snapshot,
//! 2. resolve the symbolic target against that snapshot,
//! 3. gate the request through the [`SafetyPolicy`],
//! 4. execute on the [`MotionBridge`],
//! 5. only then persist the resulting object pose through the store.
//!
//! Any stage failure aborts the call with that stage's error and **no**
//! partial mutation – the store is only touched after bridge success.
//! `stop` is the deliberate exception to gating: it skips resolution and
//! safety entirely, because refusing to stop would itself be unsafe.
//!
//! A concurrent mutation that commits between resolution and execution does
//! not re-validate this call; the dispatch completes against its original
//! snapshot.  That staleness window is bounded by a single mutation and is
//! an accepted part of the contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use gantry_bridge::{BridgeStatus, MotionAction, MotionBridge};
use gantry_kernel::{MotionRequest, SafetyPolicy};
use gantry_store::ConfigStore;
use gantry_types::{
    GantryError, LlmInfo, ObjectRecord, Pose, ResolvedTarget, TargetKind, WorkspaceBounds,
    WorldState, Zone,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::resolver::{self, DEFAULT_OBJECT_TOLERANCE_M};

/// Grip strength applied when the caller does not specify one.
pub const DEFAULT_GRIP_STRENGTH: f64 = 0.6;

fn default_grip_strength() -> f64 {
    DEFAULT_GRIP_STRENGTH
}

/// A parsed tool call.  The serde envelope matches the wire shape
/// `{"name": …, "arguments": {…}}` produced by the LLM integration and its
/// fallback parser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    Pick {
        object_id: String,
        #[serde(default = "default_grip_strength")]
        grip_strength: f64,
        #[serde(default)]
        confidence: Option<f64>,
        #[serde(default)]
        force_newton: Option<f64>,
    },
    Place {
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        pose: Option<Pose>,
        #[serde(default)]
        confidence: Option<f64>,
        #[serde(default)]
        force_newton: Option<f64>,
    },
    Stop {},
    QueryStatus {},
    SetSpeed {
        scale: f64,
    },
    MoveObject {
        object_id: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        pose: Option<Pose>,
        #[serde(default)]
        confidence: Option<f64>,
        #[serde(default)]
        force_newton: Option<f64>,
    },
    GetConfig {},
}

impl ToolCall {
    /// Parse a raw `{name, arguments}` pair.  Unknown tool names and
    /// malformed arguments both surface as [`GantryError::Resolution`] –
    /// nothing was matched, nothing was mutated.
    pub fn parse(name: &str, arguments: serde_json::Value) -> Result<Self, GantryError> {
        let arguments = match arguments {
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        };
        serde_json::from_value(serde_json::json!({ "name": name, "arguments": arguments }))
            .map_err(|e| GantryError::Resolution(format!("tool call '{name}': {e}")))
    }
}

/// Payload of a successful motion tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionReply {
    pub achieved_pose: Pose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub held_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_pose: Option<Pose>,
}

/// Payload of a successful `set_speed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedReply {
    pub speed_scale: f64,
}

/// Payload of `query_status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReply {
    pub bridge: BridgeStatus,
    pub llm: LlmInfo,
}

/// Payload of `get_config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigReply {
    pub zones: BTreeMap<String, Zone>,
    pub objects: BTreeMap<String, ObjectRecord>,
    pub workspace: WorkspaceBounds,
}

/// Discriminated success payload of a dispatched tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolReply {
    Motion(MotionReply),
    Speed(SpeedReply),
    Status(StatusReply),
    Config(ConfigReply),
}

/// The orchestration core.  Depends only on the [`MotionBridge`] trait,
/// never a concrete backend, so swapping the mock for a hardware driver
/// changes nothing here.
pub struct ToolDispatcher {
    store: Arc<ConfigStore>,
    bridge: Arc<dyn MotionBridge>,
    policy: SafetyPolicy,
}

impl ToolDispatcher {
    pub fn new(store: Arc<ConfigStore>, bridge: Arc<dyn MotionBridge>) -> Self {
        Self {
            store,
            bridge,
            policy: SafetyPolicy::default(),
        }
    }

    /// Run one tool call to completion.
    ///
    /// # Errors
    ///
    /// The failing stage's [`GantryError`]; a failed mutating call leaves
    /// the persisted world state byte-for-byte unchanged.
    pub async fn dispatch(&self, call: ToolCall) -> Result<ToolReply, GantryError> {
        match call {
            ToolCall::Pick {
                object_id,
                grip_strength,
                confidence,
                force_newton,
            } => {
                self.pick(&object_id, grip_strength, confidence, force_newton)
                    .await
            }
            ToolCall::Place {
                target,
                pose,
                confidence,
                force_newton,
            } => self.place(target, pose, confidence, force_newton).await,
            ToolCall::Stop {} => self.stop().await,
            ToolCall::QueryStatus {} => self.query_status().await,
            ToolCall::SetSpeed { scale } => self.set_speed(scale).await,
            ToolCall::MoveObject {
                object_id,
                target,
                pose,
                confidence,
                force_newton,
            } => {
                self.move_object(&object_id, target, pose, confidence, force_newton)
                    .await
            }
            ToolCall::GetConfig {} => self.get_config(),
        }
    }

    async fn pick(
        &self,
        object_id: &str,
        grip_strength: f64,
        confidence: Option<f64>,
        force_newton: Option<f64>,
    ) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        let target = resolver::resolve(object_id, &world)?;
        self.gate(&world, confidence, force_newton).await?;

        let result = self
            .bridge
            .execute(
                MotionAction::Pick {
                    object_id: object_id.to_string(),
                    grip_strength,
                },
                &target,
            )
            .await?;
        info!(object_id, "pick executed");
        // The object is now in the gripper; its stored pose stays as-is
        // until it is placed somewhere.
        Ok(ToolReply::Motion(MotionReply {
            achieved_pose: result.achieved_pose,
            held_object: Some(object_id.to_string()),
            placed_object: None,
            new_pose: None,
        }))
    }

    async fn place(
        &self,
        target: Option<String>,
        pose: Option<Pose>,
        confidence: Option<f64>,
        force_newton: Option<f64>,
    ) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        let resolved = Self::destination(target.as_deref(), pose, &world)?;
        self.gate(&world, confidence, force_newton).await?;

        let result = self.bridge.execute(MotionAction::Place, &resolved).await?;
        let placed = result
            .placed_object
            .clone()
            .ok_or_else(|| GantryError::Motion("bridge reported no placed object".to_string()))?;

        let new_world = self
            .store
            .apply_object_pose(&placed, result.achieved_pose)?;
        info!(object_id = %placed, "place executed and persisted");
        Ok(ToolReply::Motion(MotionReply {
            achieved_pose: result.achieved_pose,
            held_object: None,
            placed_object: Some(placed.clone()),
            new_pose: new_world.objects[&placed].pose,
        }))
    }

    async fn move_object(
        &self,
        object_id: &str,
        target: Option<String>,
        pose: Option<Pose>,
        confidence: Option<f64>,
        force_newton: Option<f64>,
    ) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        let grasp = resolver::resolve(object_id, &world)?;
        let destination = Self::destination(target.as_deref(), pose, &world)?;
        self.gate(&world, confidence, force_newton).await?;

        self.bridge
            .execute(
                MotionAction::Pick {
                    object_id: object_id.to_string(),
                    grip_strength: DEFAULT_GRIP_STRENGTH,
                },
                &grasp,
            )
            .await?;
        let result = self.bridge.execute(MotionAction::Place, &destination).await?;

        let new_world = self
            .store
            .apply_object_pose(object_id, result.achieved_pose)?;
        info!(object_id, "move_object executed and persisted");
        Ok(ToolReply::Motion(MotionReply {
            achieved_pose: result.achieved_pose,
            held_object: None,
            placed_object: Some(object_id.to_string()),
            new_pose: new_world.objects[object_id].pose,
        }))
    }

    /// `stop` bypasses resolution and safety gating by design: it must
    /// succeed even while a safety violation is blocking every other tool.
    async fn stop(&self) -> Result<ToolReply, GantryError> {
        let result = self.bridge.stop().await?;
        info!("stop executed");
        Ok(ToolReply::Motion(MotionReply {
            achieved_pose: result.achieved_pose,
            held_object: None,
            placed_object: None,
            new_pose: None,
        }))
    }

    /// The configured `safety.speed_scale` is a maximum, not a default: a
    /// request above it fails, and a granted request mutates only the
    /// bridge session, never the persisted config.
    async fn set_speed(&self, scale: f64) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        self.policy.check(
            &MotionRequest {
                speed_scale: Some(scale),
                ..MotionRequest::default()
            },
            &world.safety,
        )?;
        self.bridge.set_speed(scale).await?;
        info!(scale, "session speed updated");
        Ok(ToolReply::Speed(SpeedReply { speed_scale: scale }))
    }

    async fn query_status(&self) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        Ok(ToolReply::Status(StatusReply {
            bridge: self.bridge.status().await,
            llm: world.llm.unwrap_or_default(),
        }))
    }

    fn get_config(&self) -> Result<ToolReply, GantryError> {
        let world = self.store.snapshot();
        Ok(ToolReply::Config(ConfigReply {
            zones: world.zones,
            objects: world.objects,
            workspace: world.workspace,
        }))
    }

    async fn gate(
        &self,
        world: &WorldState,
        confidence: Option<f64>,
        force_newton: Option<f64>,
    ) -> Result<(), GantryError> {
        let status = self.bridge.status().await;
        self.policy.check(
            &MotionRequest {
                speed_scale: Some(status.speed_scale),
                force_newton,
                confidence,
            },
            &world.safety,
        )
    }

    fn destination(
        target: Option<&str>,
        pose: Option<Pose>,
        world: &WorldState,
    ) -> Result<ResolvedTarget, GantryError> {
        match (target, pose) {
            (Some(reference), _) => resolver::resolve(reference, world),
            (None, Some(pose)) => Ok(ResolvedTarget {
                pose,
                tolerance_m: DEFAULT_OBJECT_TOLERANCE_M,
                kind: TargetKind::Explicit,
            }),
            (None, None) => Err(GantryError::Motion("target or pose required".to_string())),
        }
    }
}
