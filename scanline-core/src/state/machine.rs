//! State machine definition

use super::events::Event;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing loaded; no channel may be started
    Unconfigured,
    /// Timing constants are in the sequencer queues; channels still stopped
    ParametersLoaded,
    /// All channels running; terminal under normal operation
    Running,
    /// Setup failed; channels that were not started stay stopped
    Fault(ErrorKind),
}

/// Types of setup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Timing constants missing, malformed or not representable
    ConfigError,
    /// A channel backend refused its parameters or its activation
    ChannelRefused,
    /// Activation attempted before every channel was loaded
    OrderViolation,
}

impl State {
    /// Check if parameters may be loaded in this state
    pub fn can_load(&self) -> bool {
        matches!(self, State::Unconfigured)
    }

    /// Check if channels may be activated in this state
    pub fn can_activate(&self) -> bool {
        matches!(self, State::ParametersLoaded)
    }

    /// Check if the channels are running
    pub fn is_running(&self) -> bool {
        matches!(self, State::Running)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Fault(_))
    }

    /// Check if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Running | State::Fault(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        match (self, event) {
            (State::Unconfigured, Event::ParametersLoaded) => State::ParametersLoaded,
            (State::Unconfigured, Event::ErrorDetected(kind)) => State::Fault(kind),

            (State::ParametersLoaded, Event::Activated) => State::Running,
            (State::ParametersLoaded, Event::ErrorDetected(kind)) => State::Fault(kind),

            // Running and Fault are terminal
            _ => self,
        }
    }
}
