//! `gantry-kernel` – Safety Policy
//!
//! The single interception point between the tool dispatcher and the motion
//! bridge.  Every motion request must pass [`SafetyPolicy::check`] before it
//! reaches hardware (or the mock standing in for it).
//!
//! # Modules
//!
//! - [`policy`] – [`SafetyPolicy`][policy::SafetyPolicy]: pure evaluation of
//!   a [`MotionRequest`][policy::MotionRequest] against the operator's
//!   [`SafetyLimits`][gantry_types::SafetyLimits], in a fixed check order so
//!   identical inputs always report the same first violation.

pub mod policy;

pub use policy::{MotionRequest, SafetyPolicy};
