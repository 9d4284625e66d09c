//! Retrain trigger
//!
//! Maps a [`DriftReport`](crate::eval::drift::DriftReport) to a
//! [`RetrainDecision`] through a [`RetrainPolicy`], applies the cooldown, and
//! runs a [`RetrainStep`] while holding an exclusive lock file so that at most
//! one retrain is in flight.

mod action;
mod config;
mod policy;
mod state;
mod step;
mod trigger;


pub use action::{Action, RetrainDecision};
pub use config::RetrainConfig;
pub use policy::RetrainPolicy;
pub use state::{RetrainLock, RetrainState, LOCK_ENV, LOCK_FILE, STATE_FILE};
pub use step::{CommandStep, InProcessStep, RetrainContext, RetrainStep};
pub use trigger::{decide, RetrainTrigger};
