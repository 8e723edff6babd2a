// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session state shared between the frame path and the rest of the guest
//! API.
//!
//! The frame path (pacer, compositor, scene submission) runs on one logical
//! thread, but two pieces of session state are mutable from outside it: the
//! tracking origin and the per-eye render descriptors. Descriptors are
//! published as immutable [`Arc`] snapshots — a writer builds the new
//! descriptor and swaps the `Arc`; a reader clones the `Arc` once at the
//! start of processing an eye and uses that snapshot exclusively, so a
//! concurrent writer can never produce a torn read. The lock is held only
//! for the pointer swap or clone, never across descriptor construction or
//! bounds math.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::eye::Eye;
use crate::geometry::FovPort;
use crate::host::TrackingOrigin;

/// What the device asks the application to render for one eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeRenderDesc {
    /// Which eye this descriptor is for.
    pub eye: Eye,
    /// The device FOV the eye is displayed with.
    pub fov: FovPort,
}

/// Per-session state read by the frame-submission path.
pub struct Session {
    frame_index: AtomicU64,
    tracking_origin: RwLock<TrackingOrigin>,
    render_desc: [RwLock<Arc<EyeRenderDesc>>; 2],
}

impl Session {
    /// Creates a session with the given tracking origin and initial per-eye
    /// render descriptors.
    #[must_use]
    pub fn new(origin: TrackingOrigin, render_desc: [EyeRenderDesc; 2]) -> Self {
        let [left, right] = render_desc;
        Self {
            frame_index: AtomicU64::new(0),
            tracking_origin: RwLock::new(origin),
            render_desc: [RwLock::new(Arc::new(left)), RwLock::new(Arc::new(right))],
        }
    }

    /// The most recently begun frame index.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index.load(Ordering::Relaxed)
    }

    pub(crate) fn record_frame_index(&self, index: u64) {
        self.frame_index.store(index, Ordering::Relaxed);
    }

    /// The session's current tracking origin.
    #[inline]
    #[must_use]
    pub fn tracking_origin(&self) -> TrackingOrigin {
        *self.tracking_origin.read()
    }

    /// Changes the tracking origin. Takes effect from the next frame that
    /// reads it.
    pub fn set_tracking_origin(&self, origin: TrackingOrigin) {
        *self.tracking_origin.write() = origin;
    }

    /// Takes a point-in-time snapshot of one eye's render descriptor.
    ///
    /// The returned snapshot stays valid (and unchanged) however many times
    /// the descriptor is republished afterwards.
    #[must_use]
    pub fn eye_render_desc(&self, eye: Eye) -> Arc<EyeRenderDesc> {
        Arc::clone(&self.render_desc[eye.index()].read())
    }

    /// Publishes a new render descriptor for one eye.
    ///
    /// Readers holding the previous snapshot keep it; new reads see the new
    /// descriptor.
    pub fn update_eye_render_desc(&self, eye: Eye, desc: EyeRenderDesc) {
        *self.render_desc[eye.index()].write() = Arc::new(desc);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("frame_index", &self.frame_index())
            .field("tracking_origin", &self.tracking_origin())
            .field("render_desc", &[
                &*self.eye_render_desc(Eye::Left),
                &*self.eye_render_desc(Eye::Right),
            ])
            .finish()
    }
}
