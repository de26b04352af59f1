//! Primitive-call boundary to the OWL transport driver.

use crate::protocol::{InitFlags, WireCamera, WireMarker, WireRigid};

/// The owlsock primitive-call surface, one method per entry point.
///
/// Implementations own the live server session. The client upholds the
/// invariant that a session exists iff its state is `Connected`, so every
/// path that leaves `Connected` calls [`shutdown`](Driver::shutdown).
///
/// Error reporting is side-band: calls do not return `Result`, the server
/// latches an error code that [`last_error`](Driver::last_error) exposes and
/// the client checks after every call.
pub trait Driver {
    /// Connect to the server at `address`. Returns a negative value on
    /// failure. Callers tear down any prior session first.
    fn init(&mut self, address: &str, flags: InitFlags) -> i32;

    /// Release any live session. Idempotent.
    fn shutdown(&mut self);

    /// Error code of the most recent call; `0` means no error.
    fn last_error(&mut self) -> i32;

    /// Configure a float-valued server parameter.
    fn set_float(&mut self, param: u32, value: f32);

    /// Configure an integer-valued server parameter.
    fn set_int(&mut self, param: u32, value: i32);

    /// Fill `out` with the next buffered marker batch, overwriting from slot
    /// zero. Returns the count written; `0` means no data available and
    /// negative values are treated the same way.
    fn get_markers(&mut self, out: &mut [WireMarker]) -> i32;

    /// Rigid-body counterpart of [`get_markers`](Driver::get_markers).
    fn get_rigids(&mut self, out: &mut [WireRigid]) -> i32;

    /// Camera counterpart of [`get_markers`](Driver::get_markers). Camera
    /// counts do not backlog, so one call per tick suffices.
    fn get_cameras(&mut self, out: &mut [WireCamera]) -> i32;
}
