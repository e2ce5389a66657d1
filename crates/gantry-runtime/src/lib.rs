//! `gantry-runtime` – the tool orchestration core.
//!
//! This is where a named tool call turns into motion: the dispatcher
//! resolves symbolic targets against the world model, gates the request
//! through the safety policy, executes it on whatever
//! [`MotionBridge`](gantry_bridge::MotionBridge) is plugged in, and persists the
//! resulting object pose through the config store before reporting back.
//!
//! # Modules
//!
//! - [`resolver`] – maps symbolic references (zone keys, `"zone N"`
//!   free text, object ids) to concrete poses and tolerances.
//! - [`dispatcher`] – [`ToolDispatcher`][dispatcher::ToolDispatcher]: the
//!   per-tool pipelines, including the unconditional `stop` path and the
//!   policy-gated `set_speed`.

pub mod dispatcher;
pub mod resolver;

pub use dispatcher::{ToolCall, ToolDispatcher, ToolReply};
pub use resolver::{DEFAULT_OBJECT_TOLERANCE_M, resolve};
