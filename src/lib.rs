//! # owltrack - Rust client for PhaseSpace OWL motion-capture servers
//!
//! Tick-driven streaming client. Provides:
//! - Connection lifecycle state machine (connect, stream, terminal error)
//! - Per-tick batch drain of markers, rigid bodies, and camera poses
//! - Server→consumer coordinate and quaternion conversion
//! - Subscriber notifications when a tick delivered new data
//!
//! ## Quick Start
//! ```
//! use owltrack::{ClientSettings, MockDriver, OwlClient};
//!
//! let mut client = OwlClient::new(MockDriver::new(), ClientSettings::default());
//! client.subscribe(|frames| {
//!     if let Some(rigid) = frames.rigid(0) {
//!         println!("rigid 0 at ({}, {}, {})", rigid.pose.px, rigid.pose.py, rigid.pose.pz);
//!     }
//! });
//!
//! // Host loop: one poll per tick. The first poll connects, later polls
//! // drain samples and fire the subscribers.
//! for _ in 0..3 {
//!     client.poll();
//! }
//! client.on_shutdown();
//! ```

pub mod buffer;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod mock;
pub mod observer;
pub mod protocol;
pub mod tracker;
pub mod types;

pub use buffer::SampleBuffer;
pub use client::{ClientSettings, ConnectionState, OwlClient, ADDRESS_PROPERTY};
pub use config::ConfigStore;
pub use driver::Driver;
pub use error::OwlError;
pub use mock::MockDriver;
pub use observer::{SubscriberId, UpdateBroadcaster};
pub use tracker::{CameraTracker, MarkerTracker, RigidTracker};
pub use types::*;

/// Result type alias for owltrack operations.
pub type Result<T> = std::result::Result<T, OwlError>;
