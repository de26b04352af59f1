//! OWL server protocol tables and wire-level sample layouts.
//!
//! Parameter ids, flag words, and error codes are bit-exact with the owlsock
//! protocol. The wire structs match the field order and widths the driver
//! writes into retrieval buffers.

use std::fmt;

// -- Set parameters --
pub const SET_FREQUENCY: u32 = 0x0200;
pub const SET_STREAMING: u32 = 0x0201;
pub const SET_INTERPOLATION: u32 = 0x0202;
pub const SET_BUTTONS: u32 = 0x0210;
pub const SET_MARKERS: u32 = 0x0211;
pub const SET_RIGIDS: u32 = 0x0212;
pub const SET_COMMDATA: u32 = 0x0220;
pub const SET_TIMESTAMP: u32 = 0x0221;

// -- Get parameters --
pub const GET_VERSION: u32 = 0x0500;
pub const GET_FRAME_NUMBER: u32 = 0x0510;

// -- Common flag values (enumerated, not a mask) --
pub const COMMON_CREATE: i32 = 0x0100;
pub const COMMON_DESTROY: i32 = 0x0101;
pub const COMMON_ENABLE: i32 = 0x0102;
pub const COMMON_DISABLE: i32 = 0x0103;

/// Server-side cap on the streaming frequency, in Hz.
pub const MAX_FREQUENCY: f32 = 480.0;

/// Streaming frequency requested at connect unless overridden, in Hz.
pub const DEFAULT_FREQUENCY: f32 = 120.0;

bitflags::bitflags! {
    /// Flag word accepted by `Driver::init`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InitFlags: u32 {
        /// Attach to an already-running server instead of starting one.
        const SLAVE = 0x0001;
        /// Replay from a capture file rather than live hardware.
        const FILE = 0x0002;
        const POST_PROCESS = 0x0010;
    }
}

// -- Error codes reported by `Driver::last_error` --
pub const NO_ERROR: i32 = 0x0000;

/// Decoded server error code.
///
/// Unknown codes are preserved numerically rather than collapsed, so logs
/// keep whatever the server actually reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoError,
    InvalidValue,
    InvalidEnum,
    InvalidOperation,
    Unknown(i32),
}

impl ErrorCode {
    pub fn from_raw(code: i32) -> ErrorCode {
        match code {
            0x0000 => ErrorCode::NoError,
            0x0020 => ErrorCode::InvalidValue,
            0x0021 => ErrorCode::InvalidEnum,
            0x0022 => ErrorCode::InvalidOperation,
            other => ErrorCode::Unknown(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            ErrorCode::NoError => 0x0000,
            ErrorCode::InvalidValue => 0x0020,
            ErrorCode::InvalidEnum => 0x0021,
            ErrorCode::InvalidOperation => 0x0022,
            ErrorCode::Unknown(code) => code,
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorCode::NoError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::NoError => write!(f, "NoError"),
            ErrorCode::InvalidValue => write!(f, "InvalidValue"),
            ErrorCode::InvalidEnum => write!(f, "InvalidEnum"),
            ErrorCode::InvalidOperation => write!(f, "InvalidOperation"),
            ErrorCode::Unknown(code) => write!(f, "Unknown({:#06x})", code),
        }
    }
}

// -- Wire sample layouts --
//
// The driver fills caller-owned arrays of these structs. Positions are in
// server space (right-handed); quaternions arrive in (w, x, y, z) order.

/// Point marker as written by the driver.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WireMarker {
    pub id: i32,
    pub frame: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub cond: f32,
    pub flag: u32,
}

/// Position plus server-order (w, x, y, z) quaternion.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WirePose {
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub rw: f32,
    pub rx: f32,
    pub ry: f32,
    pub rz: f32,
}

/// Rigid-body sample as written by the driver.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WireRigid {
    pub id: i32,
    pub frame: i32,
    pub pose: WirePose,
    pub cond: f32,
    pub flag: u32,
}

/// Camera pose as written by the driver. Cameras carry no frame counter.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WireCamera {
    pub id: i32,
    pub pose: WirePose,
    pub cond: f32,
    pub flag: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_round_trip() {
        for raw in [0x0000, 0x0020, 0x0021, 0x0022, 0x7f31] {
            assert_eq!(ErrorCode::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn error_code_classification() {
        assert!(!ErrorCode::from_raw(NO_ERROR).is_error());
        assert!(ErrorCode::from_raw(0x0022).is_error());
        assert_eq!(ErrorCode::from_raw(0x0020), ErrorCode::InvalidValue);
        assert_eq!(ErrorCode::from_raw(0x0999), ErrorCode::Unknown(0x0999));
    }

    #[test]
    fn parameter_ids_are_bit_exact() {
        assert_eq!(SET_FREQUENCY, 0x0200);
        assert_eq!(SET_STREAMING, 0x0201);
        assert_eq!(SET_MARKERS, 0x0211);
        assert_eq!(SET_RIGIDS, 0x0212);
        assert_eq!(COMMON_ENABLE, 0x0102);
        assert_eq!(COMMON_DISABLE, 0x0103);
        assert_eq!(InitFlags::SLAVE.bits(), 0x0001);
    }

    #[test]
    fn wire_layouts_have_fixed_widths() {
        use std::mem::size_of;
        assert_eq!(size_of::<WireMarker>(), 28);
        assert_eq!(size_of::<WirePose>(), 28);
        assert_eq!(size_of::<WireRigid>(), 44);
        assert_eq!(size_of::<WireCamera>(), 40);
    }
}
