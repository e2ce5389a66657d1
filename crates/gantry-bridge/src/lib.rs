//! `gantry-bridge` – the motion execution seam.
//!
//! The dispatcher never talks to a robot directly; it talks to the
//! [`MotionBridge`] trait.  Today the only implementation is the
//! [`MockBridge`], which simulates instantaneous, always-achievable motion;
//! a ROS2/MoveIt2-backed bridge is a drop-in replacement behind the same
//! trait and requires no change to orchestration logic.
//!
//! # Modules
//!
//! - [`traits`] – [`MotionBridge`][traits::MotionBridge] plus the action,
//!   result and status types that cross the seam.
//! - [`mock`] – [`MockBridge`][mock::MockBridge]: stateful pick/place/stop
//!   simulation for development and headless CI.

pub mod mock;
pub mod traits;

pub use mock::MockBridge;
pub use traits::{BridgeStatus, MotionAction, MotionBridge, MotionPhase, MotionResult};
