//! `gantry-types` – shared world model and error types.
//!
//! Everything the rest of the stack agrees on lives here: the persisted
//! world model ([`WorldState`] and its parts), the resolved motion target
//! handed to the bridge ([`ResolvedTarget`]), and the single error enum
//! ([`GantryError`]) whose variants are exactly the failure kinds that cross
//! the tool-call wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Orientation of the end effector, in radians.  Optional everywhere: a
/// tabletop pick-and-place scaffold mostly cares about position only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// A Cartesian pose in the robot's base frame, in metres.
///
/// `orientation` is omitted from serialization when absent so that a
/// position-only pose round-trips with an identical key set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl Pose {
    /// Position-only pose at the given coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            orientation: None,
        }
    }
}

/// A named drop-off region on the workspace, keyed in [`WorldState::zones`]
/// by its canonical string-form numeric key (`"1"`, `"2"`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub center_pose: Pose,
    /// Placement tolerance radius in metres.  Must be positive.
    pub tolerance_m: f64,
}

/// A tracked object.  An object that has not been placed yet has no `pose`
/// entry at all – absence, not a null pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<Pose>,
}

/// Operator-configured safety thresholds.  All three fields are required;
/// ranges are enforced once, at load time ([`WorldState::validate`]), never
/// at use time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Minimum tool-call confidence the caller must supply, in `[0, 1]`.
    pub confidence_threshold: f64,
    /// Maximum motion speed scale, in `(0, 1]`.
    pub speed_scale: f64,
    /// Maximum allowed gripper/contact force in newtons.  Positive.
    pub force_threshold_newton: f64,
}

/// Per-axis `[min, max]` extent, serialized as a two-element sequence to
/// match the operator-edited YAML (`bounds_m: { x: [0.0, 1.0], … }`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange(pub f64, pub f64);

impl AxisRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }
}

/// Workspace extents.  Only the (out-of-process) map projector consumes
/// these; the core merely validates and round-trips them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBounds {
    #[serde(default)]
    pub bounds_m: BTreeMap<String, AxisRange>,
}

impl WorkspaceBounds {
    pub fn is_empty(&self) -> bool {
        self.bounds_m.is_empty()
    }
}

/// LLM provider metadata carried in the settings file.  Opaque to this
/// core: unknown keys are preserved verbatim so that load → persist →
/// load never drops operator-supplied fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmInfo {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for LlmInfo {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

/// The aggregate world model, owned exclusively by the config store.
///
/// `BTreeMap`s keep the persisted document deterministic: the same state
/// always serializes to the same bytes, which makes external-edit detection
/// and round-trip tests exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub safety: SafetyLimits,
    #[serde(default)]
    pub zones: BTreeMap<String, Zone>,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectRecord>,
    #[serde(default, skip_serializing_if = "WorkspaceBounds::is_empty")]
    pub workspace: WorkspaceBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmInfo>,
}

impl WorldState {
    /// Enforce the schema invariants that serde's shape checking cannot:
    /// threshold ranges, positive zone tolerances, and ordered workspace
    /// extents.  Called by the store on every load and reload.
    pub fn validate(&self) -> Result<(), GantryError> {
        let safety = &self.safety;
        if !(0.0..=1.0).contains(&safety.confidence_threshold) {
            return Err(GantryError::ConfigLoad(format!(
                "safety.confidence_threshold {} outside [0, 1]",
                safety.confidence_threshold
            )));
        }
        if !(safety.speed_scale > 0.0 && safety.speed_scale <= 1.0) {
            return Err(GantryError::ConfigLoad(format!(
                "safety.speed_scale {} outside (0, 1]",
                safety.speed_scale
            )));
        }
        if safety.force_threshold_newton <= 0.0 {
            return Err(GantryError::ConfigLoad(format!(
                "safety.force_threshold_newton {} must be positive",
                safety.force_threshold_newton
            )));
        }
        for (key, zone) in &self.zones {
            if zone.tolerance_m <= 0.0 {
                return Err(GantryError::ConfigLoad(format!(
                    "zone '{key}' tolerance_m {} must be positive",
                    zone.tolerance_m
                )));
            }
        }
        for (axis, range) in &self.workspace.bounds_m {
            if range.min() >= range.max() {
                return Err(GantryError::ConfigLoad(format!(
                    "workspace axis '{axis}' min {} not below max {}",
                    range.min(),
                    range.max()
                )));
            }
        }
        Ok(())
    }
}

/// What a symbolic reference resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A configured zone, by canonical key.
    Zone(String),
    /// A tracked object, by id.
    Object(String),
    /// An explicit caller-supplied pose with no backing entry.
    Explicit,
}

/// A concrete motion target: the pose the bridge should achieve and the
/// placement tolerance that applies there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub pose: Pose,
    pub tolerance_m: f64,
    pub kind: TargetKind,
}

/// Workspace-wide error type.  One variant per failure kind that crosses
/// the tool-call wire; [`GantryError::kind`] yields the stable wire string.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GantryError {
    /// The settings file is missing, malformed, or fails schema validation.
    /// Fatal at startup, recoverable via reload at runtime.
    #[error("config load failed: {0}")]
    ConfigLoad(String),

    /// The settings file could not be written.  The in-memory state has
    /// been rolled back to its pre-mutation value.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// A symbolic reference matched neither a zone nor a tracked object.
    #[error("unknown target: {0}")]
    Resolution(String),

    /// A requested action exceeds a configured safety threshold.
    #[error("safety violation: {limit} (requested {requested}, limit {allowed})")]
    SafetyViolation {
        limit: String,
        requested: f64,
        allowed: f64,
    },

    /// Bridge-level failure: an invalid state transition now, or a
    /// timeout/fault once a hardware bridge exists.
    #[error("motion failed: {0}")]
    Motion(String),
}

impl GantryError {
    /// Stable failure-kind discriminant for the `{kind, message}` wire shape.
    pub fn kind(&self) -> &'static str {
        match self {
            GantryError::ConfigLoad(_) => "config_load",
            GantryError::Persistence(_) => "persistence",
            GantryError::Resolution(_) => "resolution",
            GantryError::SafetyViolation { .. } => "safety_violation",
            GantryError::Motion(_) => "motion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_world() -> WorldState {
        let mut zones = BTreeMap::new();
        zones.insert(
            "1".to_string(),
            Zone {
                center_pose: Pose::new(0.10, 0.20, 0.05),
                tolerance_m: 0.02,
            },
        );
        WorldState {
            safety: SafetyLimits {
                confidence_threshold: 0.6,
                speed_scale: 0.5,
                force_threshold_newton: 20.0,
            },
            zones,
            objects: BTreeMap::new(),
            workspace: WorkspaceBounds::default(),
            llm: None,
        }
    }

    #[test]
    fn pose_without_orientation_roundtrips_without_key() {
        let pose = Pose::new(0.1, 0.2, 0.3);
        let json = serde_json::to_string(&pose).unwrap();
        assert!(!json.contains("orientation"));
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(pose, back);
    }

    #[test]
    fn pose_with_orientation_roundtrips() {
        let pose = Pose {
            orientation: Some(Orientation {
                roll: 0.0,
                pitch: 1.5707963267948966,
                yaw: -0.5,
            }),
            ..Pose::new(0.1, 0.2, 0.3)
        };
        let yaml = serde_yaml::to_string(&pose).unwrap();
        let back: Pose = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(pose, back);
    }

    #[test]
    fn axis_range_serializes_as_two_element_sequence() {
        let range = AxisRange(0.0, 1.0);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[0.0,1.0]");
    }

    #[test]
    fn world_state_yaml_roundtrip_preserves_exact_values() {
        let mut world = minimal_world();
        world.objects.insert(
            "yellow_cube".to_string(),
            ObjectRecord {
                pose: Some(Pose::new(0.35, 0.15, 0.05)),
            },
        );
        world
            .workspace
            .bounds_m
            .insert("x".to_string(), AxisRange(0.0, 1.0));
        world
            .workspace
            .bounds_m
            .insert("y".to_string(), AxisRange(0.0, 0.6));

        let yaml = serde_yaml::to_string(&world).unwrap();
        let back: WorldState = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(world, back);
        // Deterministic serialization: same state, same bytes.
        assert_eq!(yaml, serde_yaml::to_string(&back).unwrap());
    }

    #[test]
    fn llm_extra_keys_are_preserved() {
        let yaml = "provider: ollama\nmodel: llama3\ntemperature: 0.2\n";
        let info: LlmInfo = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(info.provider, "ollama");
        assert!(info.extra.contains_key("temperature"));
        let back = serde_yaml::to_string(&info).unwrap();
        assert!(back.contains("temperature"));
    }

    #[test]
    fn missing_safety_block_fails_deserialization() {
        let yaml = "zones: {}\nobjects: {}\n";
        assert!(serde_yaml::from_str::<WorldState>(yaml).is_err());
    }

    #[test]
    fn unplaced_object_serializes_without_pose_key() {
        let record = ObjectRecord { pose: None };
        let yaml = serde_yaml::to_string(&record).unwrap();
        assert!(!yaml.contains("pose"));
    }

    #[test]
    fn validate_accepts_minimal_world() {
        assert!(minimal_world().validate().is_ok());
    }

    #[test]
    fn validate_rejects_confidence_out_of_range() {
        let mut world = minimal_world();
        world.safety.confidence_threshold = 1.5;
        assert!(matches!(
            world.validate(),
            Err(GantryError::ConfigLoad(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_speed_scale() {
        let mut world = minimal_world();
        world.safety.speed_scale = 0.0;
        assert!(world.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_force_threshold() {
        let mut world = minimal_world();
        world.safety.force_threshold_newton = 0.0;
        assert!(world.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_zone_tolerance() {
        let mut world = minimal_world();
        world.zones.get_mut("1").unwrap().tolerance_m = 0.0;
        let err = world.validate().unwrap_err();
        assert!(err.to_string().contains("zone '1'"));
    }

    #[test]
    fn validate_rejects_inverted_workspace_axis() {
        let mut world = minimal_world();
        world
            .workspace
            .bounds_m
            .insert("x".to_string(), AxisRange(1.0, 0.0));
        assert!(world.validate().is_err());
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(GantryError::ConfigLoad(String::new()).kind(), "config_load");
        assert_eq!(GantryError::Persistence(String::new()).kind(), "persistence");
        assert_eq!(GantryError::Resolution(String::new()).kind(), "resolution");
        assert_eq!(
            GantryError::SafetyViolation {
                limit: "speed_scale".to_string(),
                requested: 0.8,
                allowed: 0.5,
            }
            .kind(),
            "safety_violation"
        );
        assert_eq!(GantryError::Motion(String::new()).kind(), "motion");
    }

    #[test]
    fn safety_violation_names_the_limit() {
        let err = GantryError::SafetyViolation {
            limit: "speed_scale".to_string(),
            requested: 0.8,
            allowed: 0.5,
        };
        assert!(err.to_string().contains("speed_scale"));
        assert!(err.to_string().contains("0.8"));
    }
}
