#![forbid(unsafe_code)]

//! Core scheduling engine for the Recall spaced-repetition system.
//!
//! This crate provides:
//! - Domain types (cards, grades, lifecycle states, field updates)
//! - Three interchangeable scheduling strategies (classical ease-factor,
//!   stability/difficulty retention model, fixed interval ladder)
//! - Strategy selection from deck configuration
//! - The clock/random provider injected into every scheduling call
//!
//! The engine is a pure library: strategies never perform I/O or mutate
//! their inputs. They consume a card snapshot, a graded response, a deck
//! configuration, and a [`ReviewContext`], and return a partial field
//! update that the caller applies and persists.

pub mod boxes;
pub mod classical;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod logging;
pub mod retention;
pub mod types;

// Re-export commonly used types
pub use config::{Config, DeckConfig};
pub use context::ReviewContext;
pub use engine::{initialize_new, preview_intervals, schedule_answer, Strategy};
pub use error::{Error, Result};
pub use types::*;
