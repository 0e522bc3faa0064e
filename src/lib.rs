// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;
pub mod sql;

pub mod corrections;
pub mod csv;
pub mod error;
pub mod file;
pub mod input;
pub mod model;
pub mod names;
pub mod photo;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod roster;
pub mod runner;
pub mod timing;

pub use error::{Error, Result};
