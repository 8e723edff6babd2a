// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent host overlays backing quad layers.
//!
//! Every overlay is keyed to a swap chain, not to a position in the layer
//! list: a quad layer that moves around in the submission array keeps its
//! overlay, which is what prevents flicker between overlays. The manager
//! creates overlays lazily on first use, refreshes their properties every
//! frame they are submitted, and diffs the per-frame active set against the
//! previous frame's purely to decide show/hide transitions.
//!
//! Host errors from individual overlay operations are logged through the
//! [`log`] facade and not propagated; a failed property set on one overlay
//! must not fail the whole frame.
//!
//! Overlay handles are never released by this core. See the crate design
//! notes for the resource-growth consequence.

use crate::chain::TextureSwapChain;
use crate::geometry::viewport_to_bounds;
use crate::host::{HostRuntime, OverlayHandle, TrackedDeviceIndex, TrackingOrigin};
use crate::layer::QuadLayer;
use crate::result::HostError;
use crate::transform::Matrix34;

fn log_overlay_result(operation: &str, result: Result<(), HostError>) {
    if let Err(error) = result {
        log::warn!("overlay {operation} rejected by host: {error:?}");
    }
}

/// Creates, positions, shows, and hides the host overlays that render quad
/// layers.
#[derive(Debug, Default)]
pub struct OverlayManager {
    /// Overlays shown by the previous frame, for the show/hide diff.
    active: Vec<OverlayHandle>,
    /// Overlay creation attempts so far; feeds the process-unique key.
    created: u32,
}

impl OverlayManager {
    /// Creates a manager with an empty active set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The overlays shown by the most recently reconciled frame.
    #[must_use]
    pub fn active(&self) -> &[OverlayHandle] {
        &self.active
    }

    /// Returns the chain's overlay, creating one on first use.
    ///
    /// A freshly created handle is cached on the chain for its lifetime. On
    /// creation failure nothing is cached and `None` is returned; the quad
    /// is skipped this frame and the next submission retries.
    pub fn get_or_create(
        &mut self,
        runtime: &mut dyn HostRuntime,
        chain: &TextureSwapChain,
        key_prefix: &str,
        display_name: &str,
    ) -> Option<OverlayHandle> {
        if let Some(handle) = chain.overlay() {
            return Some(handle);
        }

        let key = format!("{key_prefix}{}", self.created);
        self.created += 1;
        match runtime.create_overlay(&key, display_name) {
            Ok(handle) => {
                chain.cache_overlay(handle);
                Some(handle)
            }
            Err(error) => {
                log::warn!("overlay creation for key {key:?} failed: {error:?}");
                None
            }
        }
    }

    /// Pushes one quad layer's state to its overlay and shows it.
    ///
    /// `sort_order` is the layer's position in this frame's submission list;
    /// later positions draw later. The host's own compositor owns final draw
    /// order beyond this hint.
    pub fn update(
        &self,
        runtime: &mut dyn HostRuntime,
        chain: &TextureSwapChain,
        layer: &QuadLayer,
        overlay: OverlayHandle,
        sort_order: u32,
        origin: TrackingOrigin,
        backend_flips_v: bool,
    ) {
        log_overlay_result("sort order", runtime.set_overlay_sort_order(overlay, sort_order));
        log_overlay_result(
            "width",
            runtime.set_overlay_width_in_meters(overlay, layer.size_in_meters[0]),
        );

        let transform = Matrix34::from_pose(layer.pose);
        if layer.flags.head_locked {
            log_overlay_result(
                "transform",
                runtime.set_overlay_transform_tracked_device(
                    overlay,
                    TrackedDeviceIndex::HMD,
                    &transform,
                ),
            );
        } else {
            log_overlay_result(
                "transform",
                runtime.set_overlay_transform_absolute(overlay, origin, &transform),
            );
        }

        // TODO: request anisotropic sampling when layer.flags.high_quality
        // is set, once the host trait grows the overlay-flags op.
        let texture = chain.current_texture().to_host_texture();
        log_overlay_result("texture", runtime.set_overlay_texture(overlay, &texture));
        let bounds = viewport_to_bounds(
            layer.viewport,
            chain.desc().width,
            chain.desc().height,
            layer.flags.texture_origin_at_bottom_left,
            backend_flips_v,
        );
        log_overlay_result(
            "texture bounds",
            runtime.set_overlay_texture_bounds(overlay, bounds),
        );

        log_overlay_result("show", runtime.show_overlay(overlay));
    }

    /// Hides every overlay from the previous frame that this frame did not
    /// show, then adopts `current` as the new active set.
    ///
    /// Never creates or destroys overlays.
    pub fn reconcile(&mut self, runtime: &mut dyn HostRuntime, current: Vec<OverlayHandle>) {
        for &overlay in &self.active {
            if !current.contains(&overlay) {
                log_overlay_result("hide", runtime.hide_overlay(overlay));
            }
        }
        self.active = current;
    }
}
