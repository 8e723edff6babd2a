// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording, scriptable host runtime.

use parallax_core::backend::HostTexture;
use parallax_core::eye::Eye;
use parallax_core::geometry::TextureBounds;
use parallax_core::host::{
    HostRuntime, OverlayHandle, SubmitFlags, TrackedDeviceIndex, TrackingOrigin,
};
use parallax_core::result::HostError;
use parallax_core::transform::Matrix34;

/// One recorded scene submission.
#[derive(Clone, Copy, Debug)]
pub struct SubmitRecord {
    /// Which eye was submitted.
    pub eye: Eye,
    /// Handle of the submitted texture.
    pub handle: u64,
    /// Pose carried in the texture's pose slot.
    pub pose: Matrix34,
    /// Submitted UV bounds.
    pub bounds: TextureBounds,
    /// Submission flags.
    pub flags: SubmitFlags,
}

/// One recorded overlay transform call.
#[derive(Clone, Copy, Debug)]
pub enum TransformRecord {
    /// `set_overlay_transform_tracked_device`.
    TrackedDevice {
        /// The overlay positioned.
        overlay: OverlayHandle,
        /// The device it was attached to.
        device: TrackedDeviceIndex,
        /// The transform set.
        transform: Matrix34,
    },
    /// `set_overlay_transform_absolute`.
    Absolute {
        /// The overlay positioned.
        overlay: OverlayHandle,
        /// The tracking origin used.
        origin: TrackingOrigin,
        /// The transform set.
        transform: Matrix34,
    },
}

/// A [`HostRuntime`] that records every call and returns scripted results.
///
/// All result fields default to success; tests flip them to exercise error
/// paths.
#[derive(Debug)]
pub struct FakeRuntime {
    next_overlay: u64,
    /// Result returned by every pose wait.
    pub wait_result: Result<(), HostError>,
    /// Result returned by every scene submission.
    pub submit_result: Result<(), HostError>,
    /// When set, overlay creation fails until cleared.
    pub fail_overlay_creation: bool,
    /// Number of pose waits issued.
    pub wait_calls: u32,
    /// Every scene submission, in call order.
    pub submits: Vec<SubmitRecord>,
    /// `(key, display_name)` of every overlay-creation attempt, including
    /// scripted failures.
    pub created_overlays: Vec<(String, String)>,
    /// Every sort-order set.
    pub sort_orders: Vec<(OverlayHandle, u32)>,
    /// Every width set.
    pub widths: Vec<(OverlayHandle, f32)>,
    /// Texture handle of every overlay-texture set.
    pub overlay_textures: Vec<(OverlayHandle, u64)>,
    /// Every overlay-bounds set.
    pub overlay_bounds: Vec<(OverlayHandle, TextureBounds)>,
    /// Every transform set.
    pub transforms: Vec<TransformRecord>,
    /// Every show, in call order.
    pub shows: Vec<OverlayHandle>,
    /// Every hide, in call order.
    pub hides: Vec<OverlayHandle>,
    /// The seated-to-standing offset reported to the compositor.
    pub seated_offset: Matrix34,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    /// Creates a runtime where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_overlay: 1,
            wait_result: Ok(()),
            submit_result: Ok(()),
            fail_overlay_creation: false,
            wait_calls: 0,
            submits: Vec::new(),
            created_overlays: Vec::new(),
            sort_orders: Vec::new(),
            widths: Vec::new(),
            overlay_textures: Vec::new(),
            overlay_bounds: Vec::new(),
            transforms: Vec::new(),
            shows: Vec::new(),
            hides: Vec::new(),
            seated_offset: Matrix34::IDENTITY,
        }
    }
}

impl HostRuntime for FakeRuntime {
    fn wait_for_poses(&mut self) -> Result<(), HostError> {
        self.wait_calls += 1;
        self.wait_result
    }

    fn submit(
        &mut self,
        eye: Eye,
        texture: &HostTexture,
        bounds: TextureBounds,
        flags: SubmitFlags,
    ) -> Result<(), HostError> {
        self.submits.push(SubmitRecord {
            eye,
            handle: texture.handle,
            pose: texture.pose,
            bounds,
            flags,
        });
        self.submit_result
    }

    fn create_overlay(&mut self, key: &str, display_name: &str) -> Result<OverlayHandle, HostError> {
        self.created_overlays
            .push((key.to_owned(), display_name.to_owned()));
        if self.fail_overlay_creation {
            return Err(HostError::Other(1));
        }
        let handle = OverlayHandle(self.next_overlay);
        self.next_overlay += 1;
        Ok(handle)
    }

    fn set_overlay_texture(
        &mut self,
        overlay: OverlayHandle,
        texture: &HostTexture,
    ) -> Result<(), HostError> {
        self.overlay_textures.push((overlay, texture.handle));
        Ok(())
    }

    fn set_overlay_texture_bounds(
        &mut self,
        overlay: OverlayHandle,
        bounds: TextureBounds,
    ) -> Result<(), HostError> {
        self.overlay_bounds.push((overlay, bounds));
        Ok(())
    }

    fn set_overlay_width_in_meters(
        &mut self,
        overlay: OverlayHandle,
        width: f32,
    ) -> Result<(), HostError> {
        self.widths.push((overlay, width));
        Ok(())
    }

    fn set_overlay_sort_order(
        &mut self,
        overlay: OverlayHandle,
        order: u32,
    ) -> Result<(), HostError> {
        self.sort_orders.push((overlay, order));
        Ok(())
    }

    fn set_overlay_transform_tracked_device(
        &mut self,
        overlay: OverlayHandle,
        device: TrackedDeviceIndex,
        transform: &Matrix34,
    ) -> Result<(), HostError> {
        self.transforms.push(TransformRecord::TrackedDevice {
            overlay,
            device,
            transform: *transform,
        });
        Ok(())
    }

    fn set_overlay_transform_absolute(
        &mut self,
        overlay: OverlayHandle,
        origin: TrackingOrigin,
        transform: &Matrix34,
    ) -> Result<(), HostError> {
        self.transforms.push(TransformRecord::Absolute {
            overlay,
            origin,
            transform: *transform,
        });
        Ok(())
    }

    fn show_overlay(&mut self, overlay: OverlayHandle) -> Result<(), HostError> {
        self.shows.push(overlay);
        Ok(())
    }

    fn hide_overlay(&mut self, overlay: OverlayHandle) -> Result<(), HostError> {
        self.hides.push(overlay);
        Ok(())
    }

    fn seated_to_standing_pose(&self) -> Matrix34 {
        self.seated_offset
    }
}
