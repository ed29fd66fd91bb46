//! Unified error types for blekbd.
//!
//! All variants carry only fixed-size data - no `alloc`. Core types
//! implement `defmt::Format` behind the `defmt` feature so they stay
//! host-testable.

/// Failure of a single key press/release resolution.
///
/// Both kinds are permanent for the failing call and are never retried
/// internally; the caller decides whether to skip, substitute, or release
/// held keys first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyError {
    /// The identifier has no HID usage equivalent (e.g. a control
    /// character other than BS/TAB/LF).
    Unmapped,

    /// All six key slots are already occupied (6-key rollover limit);
    /// the key was dropped.
    Overflow,
}

/// Top-level error type used by the embedded binary.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Key resolution failed.
    Key(KeyError),

    /// GATT server registration with the SoftDevice failed.
    GattRegister,

    /// Advertising could not be started.
    Advertise,
}

impl From<KeyError> for Error {
    fn from(e: KeyError) -> Self {
        Error::Key(e)
    }
}
