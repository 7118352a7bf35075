//! # SoloFit Core
//!
//! Core library for SoloFit, a solo fitness coach. It runs guided workout
//! and evaluation sessions, scores them and keeps the user's profile.
//!
//! ## Main Components
//!
//! - **Session engine** ([`session`]): phase state machine driven by a single
//!   countdown. Sessions are plain state machines: callers feed them ticks
//!   and commands, and they answer with [`Event`]s.
//! - **Scoring** ([`scoring`]): ranks, points and completion messages.
//! - **Profile** ([`profile`]): user profile, workout history and the
//!   [`ProfileStore`] seam.
//! - **Storage** ([`storage`]): TOML configuration and the SQLite store.
//! - **Driver** ([`driver`]): async loop that runs a session against a tick
//!   source, a command channel, a navigator and a store.
//!
//! ## Example
//!
//! ```
//! use solofit_core::{Command, Program, Session, TimerSettings, WorkoutSession};
//!
//! let mut session = WorkoutSession::new(Program::full_body(), TimerSettings::default());
//! session.apply(Command::Skip).unwrap();
//! session.apply(Command::Complete).unwrap();
//! assert_eq!(session.completion_pct(), 11);
//! ```

pub mod driver;
pub mod error;
pub mod events;
pub mod navigation;
pub mod profile;
pub mod results;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod storage;
pub mod ticks;

pub use driver::{Exit, Outcome, SessionDriver, Update};
pub use error::{ConfigError, CoreError, SessionError, StoreError, ValidationError};
pub use events::Event;
pub use navigation::{Navigator, Route, RouteLog};
pub use profile::{
    CoachingStyle, Gender, MemoryStore, Profile, ProfileStore, ProfileUpdate, WorkoutRecord,
};
pub use results::{save_results, SaveStatus};
pub use scoring::{Badge, Rank, Score};
pub use session::{
    format_clock, Command, EvaluationSession, Exercise, FeedbackTag, Input, Phase, PhaseKind,
    Program, Session, SessionKind, SessionSummary, TimerId, TimerSettings, WorkoutSession,
};
pub use stats::ProgressStats;
pub use storage::{data_dir, Config, Database};
pub use ticks::{IntervalTicks, ManualTicks, TickHandle, TickSource};
