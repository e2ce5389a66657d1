//! [`SafetyPolicy`] – pure threshold evaluation for motion requests.
//!
//! The policy is stateless: it compares a [`MotionRequest`] against the
//! [`SafetyLimits`] loaded from the settings file and either passes or
//! returns the first violated threshold.  Checks run in a **fixed order** –
//! speed, then force, then confidence – so repeated identical inputs always
//! name the same violation.  It never mutates anything and never does I/O;
//! a missing or malformed safety block is a load-time error in the config
//! store, not something this module ever sees.
//!
//! # Example
//!
//! ```
//! use gantry_kernel::{MotionRequest, SafetyPolicy};
//! use gantry_types::SafetyLimits;
//!
//! let limits = SafetyLimits {
//!     confidence_threshold: 0.6,
//!     speed_scale: 0.5,
//!     force_threshold_newton: 20.0,
//! };
//! let policy = SafetyPolicy::default();
//!
//! let ok = MotionRequest { speed_scale: Some(0.3), ..MotionRequest::default() };
//! assert!(policy.check(&ok, &limits).is_ok());
//!
//! let fast = MotionRequest { speed_scale: Some(0.8), ..MotionRequest::default() };
//! assert!(policy.check(&fast, &limits).is_err());
//! ```

use gantry_types::{GantryError, SafetyLimits};
use tracing::warn;

/// The safety-relevant parameters of a requested action.  Fields the caller
/// does not supply are simply not checked – the thresholds themselves are
/// always present (validated at load time).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionRequest {
    /// Requested (or session-effective) speed scale.
    pub speed_scale: Option<f64>,
    /// Requested or implied contact force in newtons.
    pub force_newton: Option<f64>,
    /// The caller's confidence in this action, e.g. an LLM tool-call score.
    pub confidence: Option<f64>,
}

/// Stateless evaluator for [`MotionRequest`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyPolicy;

impl SafetyPolicy {
    /// Evaluate `request` against `limits`.
    ///
    /// Check order is fixed: (1) speed scale, (2) force, (3) confidence.
    /// The first failing check short-circuits with
    /// [`GantryError::SafetyViolation`] naming the violated threshold.
    pub fn check(&self, request: &MotionRequest, limits: &SafetyLimits) -> Result<(), GantryError> {
        if let Some(speed) = request.speed_scale
            && speed > limits.speed_scale
        {
            return Err(self.violation("speed_scale", speed, limits.speed_scale));
        }
        if let Some(force) = request.force_newton
            && force > limits.force_threshold_newton
        {
            return Err(self.violation(
                "force_threshold_newton",
                force,
                limits.force_threshold_newton,
            ));
        }
        if let Some(confidence) = request.confidence
            && confidence < limits.confidence_threshold
        {
            return Err(self.violation(
                "confidence_threshold",
                confidence,
                limits.confidence_threshold,
            ));
        }
        Ok(())
    }

    fn violation(&self, limit: &str, requested: f64, allowed: f64) -> GantryError {
        warn!(limit, requested, allowed, "safety policy rejected request");
        GantryError::SafetyViolation {
            limit: limit.to_string(),
            requested,
            allowed,
        }
    }
}
