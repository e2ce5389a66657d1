//! HTTP adapter for the gantry orchestration stack.
//!
//! A thin [`axum`] layer over [`ToolDispatcher`](gantry_runtime::ToolDispatcher):
//! every endpoint parses the request, delegates, and wraps the outcome in the
//! uniform `{ok, result?, error?, kind?}` envelope.  No orchestration logic
//! lives here.
//!
//! Routes:
//!
//! | Method | Path             | Effect                                   |
//! |--------|------------------|------------------------------------------|
//! | POST   | `/tool-call`     | Dispatch one `{name, arguments}` call    |
//! | GET    | `/status`        | Bridge session + LLM info                |
//! | GET    | `/config`        | Zones, objects, workspace bounds         |
//! | POST   | `/config/object` | Operator upsert of an object pose        |
//! | POST   | `/config/zone`   | Operator upsert of a zone                |
//! | GET    | `/health`        | Liveness                                 |

pub mod routes;
pub mod telemetry;

pub use routes::{AppState, app};
pub use telemetry::init_tracing;

/// Default TCP port for the HTTP adapter.
pub const DEFAULT_PORT: u16 = 8000;
