//! Slot-bound consumers that materialise domain samples on notification.
//!
//! A tracker binds one buffer slot at construction and refreshes from it
//! each time the broadcaster fires. A slot index outside the current batch
//! means "no new data this tick", never an error; the previously
//! materialised sample stays as-is.

use crate::buffer::SampleBuffer;
use crate::types::{Camera, Marker, Rigid, Quat, TrackedSample};

/// Follows one marker slot. Materialises with the ignore-low-condition rule:
/// an untracked sample keeps the last good position.
#[derive(Debug, Default)]
pub struct MarkerTracker {
    slot: usize,
    marker: Marker,
}

impl MarkerTracker {
    pub fn new(slot: usize) -> MarkerTracker {
        MarkerTracker {
            slot,
            marker: Marker::default(),
        }
    }

    /// Pull the bound slot from the current batch, if in range.
    pub fn refresh(&mut self, frames: &SampleBuffer) {
        if let Some(wire) = frames.marker(self.slot) {
            self.marker.set_from_wire(wire, true);
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Consumer-space position to apply to a transform.
    pub fn position(&self) -> [f32; 3] {
        self.marker.position
    }

    /// Whether the followed marker is currently tracked.
    pub fn is_active(&self) -> bool {
        self.marker.is_tracked()
    }
}

/// Follows one rigid-body slot.
#[derive(Debug, Default)]
pub struct RigidTracker {
    slot: usize,
    rigid: Rigid,
}

impl RigidTracker {
    pub fn new(slot: usize) -> RigidTracker {
        RigidTracker {
            slot,
            rigid: Rigid::default(),
        }
    }

    pub fn refresh(&mut self, frames: &SampleBuffer) {
        if let Some(wire) = frames.rigid(self.slot) {
            self.rigid.set_from_wire(wire);
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn rigid(&self) -> &Rigid {
        &self.rigid
    }

    pub fn position(&self) -> [f32; 3] {
        self.rigid.position
    }

    pub fn orientation(&self) -> Quat {
        self.rigid.orientation
    }
}

/// Follows one capture-camera slot.
#[derive(Debug, Default)]
pub struct CameraTracker {
    slot: usize,
    camera: Camera,
}

impl CameraTracker {
    pub fn new(slot: usize) -> CameraTracker {
        CameraTracker {
            slot,
            camera: Camera::default(),
        }
    }

    pub fn refresh(&mut self, frames: &SampleBuffer) {
        if let Some(wire) = frames.camera(self.slot) {
            self.camera.set_from_wire(wire);
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn position(&self) -> [f32; 3] {
        self.camera.position
    }

    pub fn orientation(&self) -> Quat {
        self.camera.orientation
    }
}
