//! Theremin — a gesture-controlled sine theremin for the terminal.

pub mod audio;
pub mod config;
pub mod control;
pub mod error;
pub mod instrument;
pub mod mapping;
pub mod osc;
pub mod theremin;
pub mod tui;

pub use error::ThereminError;
pub use theremin::{Readout, SessionSettings, Theremin};
