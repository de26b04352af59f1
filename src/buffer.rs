//! Fixed-capacity storage for the most recent sample batches.

use crate::protocol::{WireCamera, WireMarker, WireRigid};

/// Default slot count per category.
pub const DEFAULT_CAPACITY: usize = 32;

/// Holds the latest retrieved batch of markers, rigids, and cameras.
///
/// Allocated once at construction; every retrieval call overwrites slots in
/// place starting at zero. Slots past the current batch count keep whatever
/// an earlier tick left there; the buffer never clears stale tails, so
/// readers decide validity from the count plus each sample's `cond`/`id`.
#[derive(Debug)]
pub struct SampleBuffer {
    markers: Vec<WireMarker>,
    rigids: Vec<WireRigid>,
    cameras: Vec<WireCamera>,
    marker_count: usize,
    rigid_count: usize,
    camera_count: usize,
}

impl SampleBuffer {
    /// Allocate all three categories at `capacity` slots each.
    pub fn new(capacity: usize) -> SampleBuffer {
        SampleBuffer {
            markers: vec![WireMarker::default(); capacity],
            rigids: vec![WireRigid::default(); capacity],
            cameras: vec![WireCamera::default(); capacity],
            marker_count: 0,
            rigid_count: 0,
            camera_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.markers.len()
    }

    // -- Retrieval-side access (driver writes, client commits) --

    pub(crate) fn marker_slots_mut(&mut self) -> &mut [WireMarker] {
        &mut self.markers
    }

    pub(crate) fn rigid_slots_mut(&mut self) -> &mut [WireRigid] {
        &mut self.rigids
    }

    pub(crate) fn camera_slots_mut(&mut self) -> &mut [WireCamera] {
        &mut self.cameras
    }

    /// Record a freshly written marker batch and scale its positions.
    ///
    /// Scaling applies to every slot the driver reported, regardless of the
    /// per-sample condition.
    pub(crate) fn commit_markers(&mut self, count: usize, space_scalar: f32) {
        let count = count.min(self.markers.len());
        for marker in &mut self.markers[..count] {
            marker.x *= space_scalar;
            marker.y *= space_scalar;
            marker.z *= space_scalar;
        }
        self.marker_count = count;
    }

    pub(crate) fn commit_rigids(&mut self, count: usize, space_scalar: f32) {
        let count = count.min(self.rigids.len());
        for rigid in &mut self.rigids[..count] {
            rigid.pose.px *= space_scalar;
            rigid.pose.py *= space_scalar;
            rigid.pose.pz *= space_scalar;
        }
        self.rigid_count = count;
    }

    pub(crate) fn commit_cameras(&mut self, count: usize, space_scalar: f32) {
        let count = count.min(self.cameras.len());
        for camera in &mut self.cameras[..count] {
            camera.pose.px *= space_scalar;
            camera.pose.py *= space_scalar;
            camera.pose.pz *= space_scalar;
        }
        self.camera_count = count;
    }

    // -- Reader-side access (subscribers pull by slot index) --

    /// Markers of the most recent batch, length equal to the batch count.
    pub fn markers(&self) -> &[WireMarker] {
        &self.markers[..self.marker_count]
    }

    pub fn rigids(&self) -> &[WireRigid] {
        &self.rigids[..self.rigid_count]
    }

    pub fn cameras(&self) -> &[WireCamera] {
        &self.cameras[..self.camera_count]
    }

    /// Bounds-checked slot read; `None` when `slot` is outside the current
    /// batch, which readers treat as "no new data this tick".
    pub fn marker(&self, slot: usize) -> Option<&WireMarker> {
        self.markers().get(slot)
    }

    pub fn rigid(&self, slot: usize) -> Option<&WireRigid> {
        self.rigids().get(slot)
    }

    pub fn camera(&self, slot: usize) -> Option<&WireCamera> {
        self.cameras().get(slot)
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    pub fn rigid_count(&self) -> usize {
        self.rigid_count
    }

    pub fn camera_count(&self) -> usize {
        self.camera_count
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        SampleBuffer::new(DEFAULT_CAPACITY)
    }
}
