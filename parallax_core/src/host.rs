// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host compositor runtime contract.
//!
//! The host runtime is the service actually driving the HMD: it owns pose
//! timing, the stereo scene submission, and the persistent overlay surfaces
//! quad layers are mapped onto. This module defines the trait the core calls
//! through, mirroring the host's own operation set one-to-one so a real
//! binding is a thin shim and a fake is trivial to record against.
//!
//! Every fallible operation reports the host's native result enumeration
//! ([`HostError`]); translation to unified codes happens in [`result`],
//! never at this boundary.
//!
//! [`result`]: crate::result

use crate::backend::HostTexture;
use crate::eye::Eye;
use crate::geometry::TextureBounds;
use crate::result::HostError;
use crate::transform::Matrix34;

use core::fmt;

/// A handle to a persistent host overlay surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

impl fmt::Debug for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayHandle({})", self.0)
    }
}

/// A host tracked-device index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackedDeviceIndex(pub u32);

impl TrackedDeviceIndex {
    /// The head-mounted display itself.
    pub const HMD: Self = Self(0);
}

impl fmt::Debug for TrackedDeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackedDeviceIndex({})", self.0)
    }
}

/// The tracking-space origin a session operates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingOrigin {
    /// Origin at the user's calibrated seated head position.
    Seated,
    /// Origin on the floor at the center of the play area.
    Standing,
}

/// Flags accompanying a scene submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubmitFlags {
    /// The submitted texture carries a render pose in its pose slot.
    pub texture_with_pose: bool,
}

/// Operations the host compositor runtime exposes to this core.
///
/// All methods are invoked from the frame-submission thread. The only
/// blocking call is [`wait_for_poses`](Self::wait_for_poses), which blocks
/// for a host-controlled, bounded duration and is not cancellable.
pub trait HostRuntime {
    /// Blocks until the host hands out poses for the next frame.
    fn wait_for_poses(&mut self) -> Result<(), HostError>;

    /// Submits one eye of the stereo scene.
    fn submit(
        &mut self,
        eye: Eye,
        texture: &HostTexture,
        bounds: TextureBounds,
        flags: SubmitFlags,
    ) -> Result<(), HostError>;

    /// Creates a persistent overlay surface under a process-unique key.
    fn create_overlay(&mut self, key: &str, display_name: &str) -> Result<OverlayHandle, HostError>;

    /// Binds a texture to an overlay.
    fn set_overlay_texture(
        &mut self,
        overlay: OverlayHandle,
        texture: &HostTexture,
    ) -> Result<(), HostError>;

    /// Sets the UV sub-rectangle of the overlay's texture to display.
    fn set_overlay_texture_bounds(
        &mut self,
        overlay: OverlayHandle,
        bounds: TextureBounds,
    ) -> Result<(), HostError>;

    /// Sets the overlay's physical width. Height follows the texture's
    /// aspect ratio; the host does not take it.
    fn set_overlay_width_in_meters(
        &mut self,
        overlay: OverlayHandle,
        width: f32,
    ) -> Result<(), HostError>;

    /// Hints the host's draw order for overlapping overlays; higher sorts
    /// later (on top). The host's own compositor owns final order.
    fn set_overlay_sort_order(&mut self, overlay: OverlayHandle, order: u32)
    -> Result<(), HostError>;

    /// Positions the overlay relative to a tracked device.
    fn set_overlay_transform_tracked_device(
        &mut self,
        overlay: OverlayHandle,
        device: TrackedDeviceIndex,
        transform: &Matrix34,
    ) -> Result<(), HostError>;

    /// Positions the overlay absolutely in the given tracking origin.
    fn set_overlay_transform_absolute(
        &mut self,
        overlay: OverlayHandle,
        origin: TrackingOrigin,
        transform: &Matrix34,
    ) -> Result<(), HostError>;

    /// Makes the overlay visible.
    fn show_overlay(&mut self, overlay: OverlayHandle) -> Result<(), HostError>;

    /// Hides the overlay without destroying it.
    fn hide_overlay(&mut self, overlay: OverlayHandle) -> Result<(), HostError>;

    /// The host's offset from the seated origin to the standing origin.
    fn seated_to_standing_pose(&self) -> Matrix34;
}
