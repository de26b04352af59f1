//! Scripted in-memory driver for tests and demos.
//!
//! `MockDriver` replays queued retrieval batches and injected error codes
//! through the [`Driver`] trait, and records every primitive call so tests
//! can assert on call sequences.

use crate::driver::Driver;
use crate::protocol::{InitFlags, WireCamera, WireMarker, WireRigid, NO_ERROR};
use std::collections::VecDeque;

/// A primitive call observed by the mock, in invocation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init { address: String, flags: u32 },
    Shutdown,
    SetFloat { param: u32, value: f32 },
    SetInt { param: u32, value: i32 },
    GetMarkers,
    GetRigids,
    GetCameras,
}

#[derive(Debug, Clone)]
enum Reply<T> {
    Batch(Vec<T>),
    Fail(i32),
}

/// Scripted [`Driver`] implementation.
///
/// Retrieval queues drain one entry per call; an exhausted queue reports
/// zero (no data), which is what terminates a drain loop. `last_error`
/// clears on read, matching the server's latch-and-clear semantics.
#[derive(Debug, Default)]
pub struct MockDriver {
    init_result: i32,
    error_after_init: i32,
    param_rejection: Option<(u32, i32)>,
    markers: VecDeque<Reply<WireMarker>>,
    rigids: VecDeque<Reply<WireRigid>>,
    cameras: VecDeque<Reply<WireCamera>>,
    latched_error: i32,
    session_live: bool,
    calls: Vec<Call>,
}

impl MockDriver {
    pub fn new() -> MockDriver {
        MockDriver::default()
    }

    /// Make `init` return `rc` (negative = failure).
    pub fn fail_init(mut self, rc: i32) -> MockDriver {
        self.init_result = rc;
        self
    }

    /// Latch `code` immediately after a successful `init`.
    pub fn reject_connect(mut self, code: i32) -> MockDriver {
        self.error_after_init = code;
        self
    }

    /// Latch `code` when `param` is configured via `set_float`/`set_int`.
    pub fn reject_param(mut self, param: u32, code: i32) -> MockDriver {
        self.param_rejection = Some((param, code));
        self
    }

    pub fn push_markers(&mut self, batch: Vec<WireMarker>) {
        self.markers.push_back(Reply::Batch(batch));
    }

    pub fn push_marker_error(&mut self, code: i32) {
        self.markers.push_back(Reply::Fail(code));
    }

    pub fn push_rigids(&mut self, batch: Vec<WireRigid>) {
        self.rigids.push_back(Reply::Batch(batch));
    }

    pub fn push_rigid_error(&mut self, code: i32) {
        self.rigids.push_back(Reply::Fail(code));
    }

    pub fn push_cameras(&mut self, batch: Vec<WireCamera>) {
        self.cameras.push_back(Reply::Batch(batch));
    }

    pub fn push_camera_error(&mut self, code: i32) {
        self.cameras.push_back(Reply::Fail(code));
    }

    /// Whether a live session currently exists.
    pub fn session_live(&self) -> bool {
        self.session_live
    }

    /// Every primitive call seen so far, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn count_calls(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| matcher(call)).count()
    }

    fn serve<T: Copy>(queue: &mut VecDeque<Reply<T>>, latched: &mut i32, out: &mut [T]) -> i32 {
        match queue.pop_front() {
            None => 0,
            Some(Reply::Batch(batch)) => {
                let n = batch.len().min(out.len());
                out[..n].copy_from_slice(&batch[..n]);
                n as i32
            }
            Some(Reply::Fail(code)) => {
                *latched = code;
                0
            }
        }
    }
}

impl Driver for MockDriver {
    fn init(&mut self, address: &str, flags: InitFlags) -> i32 {
        self.calls.push(Call::Init {
            address: address.to_string(),
            flags: flags.bits(),
        });
        if self.init_result >= 0 {
            self.session_live = true;
            self.latched_error = self.error_after_init;
        }
        self.init_result
    }

    fn shutdown(&mut self) {
        self.calls.push(Call::Shutdown);
        self.session_live = false;
    }

    fn last_error(&mut self) -> i32 {
        std::mem::replace(&mut self.latched_error, NO_ERROR)
    }

    fn set_float(&mut self, param: u32, value: f32) {
        self.calls.push(Call::SetFloat { param, value });
        if let Some((rejected, code)) = self.param_rejection {
            if rejected == param {
                self.latched_error = code;
            }
        }
    }

    fn set_int(&mut self, param: u32, value: i32) {
        self.calls.push(Call::SetInt { param, value });
        if let Some((rejected, code)) = self.param_rejection {
            if rejected == param {
                self.latched_error = code;
            }
        }
    }

    fn get_markers(&mut self, out: &mut [WireMarker]) -> i32 {
        self.calls.push(Call::GetMarkers);
        Self::serve(&mut self.markers, &mut self.latched_error, out)
    }

    fn get_rigids(&mut self, out: &mut [WireRigid]) -> i32 {
        self.calls.push(Call::GetRigids);
        Self::serve(&mut self.rigids, &mut self.latched_error, out)
    }

    fn get_cameras(&mut self, out: &mut [WireCamera]) -> i32 {
        self.calls.push(Call::GetCameras);
        Self::serve(&mut self.cameras, &mut self.latched_error, out)
    }
}
