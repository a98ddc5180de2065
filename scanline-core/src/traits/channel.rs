//! Shared channel shape

/// Errors a channel backend can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Activation requested before parameters were loaded
    NotLoaded,
    /// Parameters cannot change once the channel is running
    AlreadyActive,
    /// Backend cannot express the requested parameters
    Unsupported,
    /// Parameter queue had no room for the load
    QueueFull,
}

/// Common lifecycle of the horizontal, vertical and pixel channels
///
/// A channel goes from unloaded to loaded exactly once and from loaded to
/// active exactly once. There is no way back: stopping a channel set needs
/// a reset of the whole unit.
pub trait Channel {
    /// Check if parameters have been loaded
    fn is_loaded(&self) -> bool;

    /// Check if the channel is running or armed to run
    fn is_active(&self) -> bool;

    /// Start the channel
    ///
    /// A backend may only arm the channel here and start it from the
    /// release step of `VideoController::start_with`. Must fail with
    /// [`ChannelError::NotLoaded`] when called before the channel has its
    /// parameters.
    fn activate(&mut self) -> Result<(), ChannelError>;
}
