//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Both sequencers and the pixel channel accepted their parameters
    ParametersLoaded,
    /// Horizontal, vertical and pixel channels were started, in that order
    Activated,
    /// Setup failed
    ErrorDetected(ErrorKind),
}

impl Event {
    /// Check if this event indicates an error
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::ErrorDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_events() {
        assert!(Event::ErrorDetected(ErrorKind::ConfigError).is_error_event());
        assert!(!Event::Activated.is_error_event());
        assert!(!Event::ParametersLoaded.is_error_event());
    }
}
