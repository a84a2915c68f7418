//! Diagnostic notifications from the CPU.
//!
//! The CPU never returns errors from `step`. Halts and traps are reported
//! through an [`Observer`] instead.

use log::{info, warn};
use serde::{Serialize, Deserialize};
use std::fmt;

/// Something the CPU wants the host to know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// `HLT` was executed.
    Halted,
    /// A byte that is not a known opcode was fetched.
    UnknownInstruction(u8),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Halted => write!(f, "Processor halted"),
            Event::UnknownInstruction(byte) => write!(f, "Unknown instruction: {}", byte),
        }
    }
}

/// Receives CPU events.
pub trait Observer {
    fn notify(&mut self, event: Event);
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn notify(&mut self, event: Event) {
        (**self).notify(event)
    }
}

/// Prints events to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn notify(&mut self, event: Event) {
        match event {
            Event::Halted => info!("{}", event),
            Event::UnknownInstruction(_) => warn!("{}", event),
        }
        println!("{}", event);
    }
}

/// Records events in memory.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<Event> {
        self.events.last().copied()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Observer for EventLog {
    fn notify(&mut self, event: Event) {
        self.events.push(event);
    }
}
