//! Error type for the storage backends.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! The keyboard core never surfaces these to the host firmware; they are
//! logged and the in-memory configuration keeps the board usable.

/// Failures of the non-volatile storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Flash read/write/erase failed.
    Storage,

    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// No keyboard config record has been written yet.
    RecordNotFound,
}
