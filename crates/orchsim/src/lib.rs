//! # orchsim: Deterministic Message Orchestration Simulator
//!
//! A session-scoped conversation log whose assistant replies resolve
//! asynchronously with randomized latency and outcome, all driven by one
//! 32-bit seed so that any session can be replayed exactly.

#![cfg_attr(test, allow(clippy::float_cmp))] // Test assertions use exact float comparisons
#![allow(clippy::uninlined_format_args)] // Format string style preference
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Simulator                           │
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐   │
//! │  │ Clock     │   │ TimerQueue   │   │ SimRng          │   │
//! │  │ (virtual/ │   │ (pending     │   │ (mulberry32,    │   │
//! │  │  wall)    │   │  resolutions)│   │  seeded)        │   │
//! │  └───────────┘   └──────────────┘   └─────────────────┘   │
//! │                                                            │
//! │  Message log (append-only)      DecisionLog (replay)      │
//! └──────────────────────────────────────────────────────────┘
//!
//!   ModuleState ──reduce(event)──▶ ModuleState   (independent)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use orchsim::{Simulator, SimulatorOptions, Status};
//!
//! let mut sim = Simulator::new(SimulatorOptions::default().with_seed(42));
//! let reply = sim.send_user("deploy the pipeline").unwrap();
//! assert_eq!(sim.message(&reply).unwrap().status, Status::Executing);
//!
//! sim.run_until_idle();
//! assert!(sim.message(&reply).unwrap().status.is_terminal());
//! ```
//!
//! ## Key Concepts
//!
//! - **`SimRng`**: Deterministic generator; same seed, same stream, everywhere
//! - **`TimerQueue`**: Deadline-ordered pending work, cancellable by handle
//! - **`Simulator`**: The log plus resolution scheduling and chaos mode
//! - **`reduce`**: Pure module-health state machine

mod clock;
mod error;
mod event;
pub mod event_log;
pub mod machine;
mod message;
pub mod palette;
mod rng;
pub mod simulator;

pub use clock::{Clock, SimClock, SystemClock};
pub use error::SimError;
pub use event::{Timer, TimerId, TimerQueue};
pub use event_log::{Decision, DecisionLog, LoggedDecision};
pub use machine::{
    MachineEvent, MachineEventParseError, ModuleBoard, ModuleId, ModuleState, ModuleStatus,
    reduce,
};
pub use message::{Message, MessageId, Role, Status};
pub use palette::PaletteCommand;
pub use rng::{Rng, SimRng};
pub use simulator::{
    Outcome, SessionStatus, Simulator, SimulatorOptions, classify, session_id_for_seed,
    time_derived_seed,
};
