//! TUI debugger for the AL1 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register view
//! - Hex memory view
//! - Step/run/breakpoint controls
//! - Disassembly view

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
