//! Lifecycle control.
//!
//! Two populations share the activity ledger and the runtime gateway:
//!
//! ```text
//! ┌──────────────┐   list/start   ┌─────────────────┐   list/stop   ┌──────────────┐
//! │ WakeRouter   │───────────────▶│ RuntimeGateway  │◀──────────────│ IdleSweeper  │
//! │ (per request)│                └─────────────────┘               │ (one task)   │
//! │              │ record_access  ┌─────────────────┐ is_idle/forget│              │
//! │              │───────────────▶│ ActivityLedger  │◀──────────────│              │
//! └──────────────┘                └─────────────────┘               └──────────────┘
//! ```

pub mod idle_sweeper;
pub mod wake_router;

pub use idle_sweeper::{IdleSweeper, SweepReport, STOP_GRACE_PERIOD_SECS};
pub use wake_router::{normalize_host, WakeOutcome, WakeRouter};
