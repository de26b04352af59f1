//! Domain sample types and server→consumer coordinate conversion.
//!
//! Wire values stay in server space inside the [`SampleBuffer`]; conversion
//! happens here, when a domain sample is materialised from its wire slot via
//! the `from_wire`/`set_from_wire` constructors.
//!
//! [`SampleBuffer`]: crate::buffer::SampleBuffer

use crate::protocol::{WireCamera, WireMarker, WirePose, WireRigid};
use std::fmt;

/// Consumer-space unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// Map a server-space position into consumer space: `(x, y, z)` → `(x, y, -z)`.
///
/// The server frame is right-handed, the consumer frame left-handed; the
/// handedness flip is the Z negation.
pub fn convert_position(p: [f32; 3]) -> [f32; 3] {
    [p[0], p[1], -p[2]]
}

/// Map a server-space quaternion into consumer space:
/// `(x, y, z, w)` → `(x, y, -z, -w)`.
pub fn convert_quaternion(q: Quat) -> Quat {
    Quat {
        x: q.x,
        y: q.y,
        z: -q.z,
        w: -q.w,
    }
}

fn convert_pose_orientation(pose: &WirePose) -> Quat {
    // Wire order is (w, x, y, z).
    convert_quaternion(Quat {
        x: pose.rx,
        y: pose.ry,
        z: pose.rz,
        w: pose.rw,
    })
}

/// Sample category, in per-tick retrieval order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCategory {
    Markers,
    Rigids,
    Cameras,
}

impl fmt::Display for SampleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleCategory::Markers => write!(f, "marker"),
            SampleCategory::Rigids => write!(f, "rigid"),
            SampleCategory::Cameras => write!(f, "camera"),
        }
    }
}

/// Capability shared by every tracked sample, independent of whether it
/// carries an orientation.
pub trait TrackedSample {
    /// Server-assigned identity. Stable across frames for a given object,
    /// not guaranteed to equal the sample's slot index in the batch.
    fn id(&self) -> i32;
    /// Quality score; negative means not currently tracked.
    fn condition(&self) -> f32;
    /// Opaque pass-through bitmask from the server.
    fn flag(&self) -> u32;

    fn is_tracked(&self) -> bool {
        self.condition() > 0.0
    }
}

/// A single-point marker in consumer space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marker {
    pub id: i32,
    pub frame: i32,
    pub position: [f32; 3],
    pub condition: f32,
    pub flag: u32,
}

impl Marker {
    pub fn from_wire(wire: &WireMarker) -> Marker {
        let mut marker = Marker::default();
        marker.set_from_wire(wire, false);
        marker
    }

    /// Update in place from a wire slot.
    ///
    /// With `ignore_low_cond` set, an untracked sample (`cond <= 0`) keeps
    /// the previously stored position; `id`, `frame`, `condition`, and
    /// `flag` always update.
    pub fn set_from_wire(&mut self, wire: &WireMarker, ignore_low_cond: bool) {
        self.id = wire.id;
        self.frame = wire.frame;
        if !ignore_low_cond || wire.cond > 0.0 {
            self.position = convert_position([wire.x, wire.y, wire.z]);
        }
        self.condition = wire.cond;
        self.flag = wire.flag;
    }
}

impl TrackedSample for Marker {
    fn id(&self) -> i32 {
        self.id
    }
    fn condition(&self) -> f32 {
        self.condition
    }
    fn flag(&self) -> u32 {
        self.flag
    }
}

/// A tracked object with position and orientation, in consumer space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rigid {
    pub id: i32,
    pub frame: i32,
    pub position: [f32; 3],
    pub orientation: Quat,
    pub condition: f32,
    pub flag: u32,
}

impl Rigid {
    pub fn from_wire(wire: &WireRigid) -> Rigid {
        let mut rigid = Rigid::default();
        rigid.set_from_wire(wire);
        rigid
    }

    pub fn set_from_wire(&mut self, wire: &WireRigid) {
        self.id = wire.id;
        self.frame = wire.frame;
        self.position = convert_position([wire.pose.px, wire.pose.py, wire.pose.pz]);
        self.orientation = convert_pose_orientation(&wire.pose);
        self.condition = wire.cond;
        self.flag = wire.flag;
    }
}

impl TrackedSample for Rigid {
    fn id(&self) -> i32 {
        self.id
    }
    fn condition(&self) -> f32 {
        self.condition
    }
    fn flag(&self) -> u32 {
        self.flag
    }
}

/// A capture-camera pose in consumer space. Cameras carry no frame counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    pub id: i32,
    pub position: [f32; 3],
    pub orientation: Quat,
    pub condition: f32,
    pub flag: u32,
}

impl Camera {
    pub fn from_wire(wire: &WireCamera) -> Camera {
        let mut camera = Camera::default();
        camera.set_from_wire(wire);
        camera
    }

    pub fn set_from_wire(&mut self, wire: &WireCamera) {
        self.id = wire.id;
        self.position = convert_position([wire.pose.px, wire.pose.py, wire.pose.pz]);
        self.orientation = convert_pose_orientation(&wire.pose);
        self.condition = wire.cond;
        self.flag = wire.flag;
    }
}

impl TrackedSample for Camera {
    fn id(&self) -> i32 {
        self.id
    }
    fn condition(&self) -> f32 {
        self.condition
    }
    fn flag(&self) -> u32 {
        self.flag
    }
}
