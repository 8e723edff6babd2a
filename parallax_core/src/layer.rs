// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The guest SDK's layer model.
//!
//! A frame submission is a list of layers. Eye layers describe stereo scene
//! content with a field of view and render pose; quad layers describe flat,
//! positioned 2-D content that the compositor maps onto persistent host
//! overlays. Layer kinds this shim cannot composite are a legal,
//! silently-skipped case, not an error.
//!
//! Layers are caller-owned and read-only for the duration of one `end_frame`
//! call. No layer state persists across frames except what is cached on the
//! swap chain (its overlay handle) and in the overlay manager (the active
//! set).

use crate::chain::ChainId;
use crate::eye::Eye;
use crate::geometry::{FovPort, Viewport};
use crate::transform::{Matrix4, Posef};

/// Per-layer flags from the guest submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// The layer is positioned relative to the user's head rather than in
    /// tracking space.
    pub head_locked: bool,
    /// The layer's texture origin is at the bottom-left; vertical texture
    /// bounds must flip.
    pub texture_origin_at_bottom_left: bool,
    /// The producer asks for higher-quality sampling.
    pub high_quality: bool,
}

/// Stereo scene content with explicit per-eye FOV ports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeFovLayer {
    /// The left-eye chain. Also serves the right eye when
    /// [`right_texture`](Self::right_texture) is `None` (render-to-both-eyes
    /// shortcut).
    pub color_texture: ChainId,
    /// The right-eye chain, when distinct from the left.
    pub right_texture: Option<ChainId>,
    /// Per-eye pixel viewports within the chains.
    pub viewport: [Viewport; 2],
    /// Per-eye FOV the content was rendered with.
    pub fov: [FovPort; 2],
    /// Per-eye render poses.
    pub render_pose: [Posef; 2],
    /// When the poses were sampled, in the guest's clock. Carried through
    /// conversions; not consumed by submission.
    pub sensor_sample_time: f64,
    /// Layer flags.
    pub flags: LayerFlags,
}

impl EyeFovLayer {
    /// The chain serving the given eye, honoring the shared-texture
    /// shortcut.
    #[inline]
    #[must_use]
    pub fn chain_for(&self, eye: Eye) -> ChainId {
        match eye {
            Eye::Left => self.color_texture,
            Eye::Right => self.right_texture.unwrap_or(self.color_texture),
        }
    }
}

/// Stereo scene content described by per-eye projection matrices instead of
/// FOV ports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeMatrixLayer {
    /// The left-eye chain; also serves the right eye when
    /// [`right_texture`](Self::right_texture) is `None`.
    pub color_texture: ChainId,
    /// The right-eye chain, when distinct from the left.
    pub right_texture: Option<ChainId>,
    /// Per-eye pixel viewports within the chains.
    pub viewport: [Viewport; 2],
    /// Per-eye projection matrices. Only the diagonal scale terms are read.
    pub matrix: [Matrix4; 2],
    /// Per-eye render poses.
    pub render_pose: [Posef; 2],
    /// When the poses were sampled, in the guest's clock.
    pub sensor_sample_time: f64,
    /// Layer flags.
    pub flags: LayerFlags,
}

impl EyeMatrixLayer {
    /// Converts to the FOV form by reading symmetric half-angle tangents off
    /// the projection's diagonal scale terms.
    ///
    /// The sign of a diagonal term encodes the API's clip-space y direction;
    /// it is discarded, since FOV tangents are positive by definition.
    /// Everything else is copied through unchanged.
    #[must_use]
    pub fn to_fov_layer(&self) -> EyeFovLayer {
        let mut fov = [FovPort::default(); 2];
        for (port, matrix) in fov.iter_mut().zip(&self.matrix) {
            *port = FovPort::symmetric(
                (0.5 / matrix.m[0][0]).abs(),
                (0.5 / matrix.m[1][1]).abs(),
            );
        }
        EyeFovLayer {
            color_texture: self.color_texture,
            right_texture: self.right_texture,
            viewport: self.viewport,
            fov,
            render_pose: self.render_pose,
            sensor_sample_time: self.sensor_sample_time,
            flags: self.flags,
        }
    }
}

/// Flat 2-D content rendered as a persistent host overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadLayer {
    /// The chain holding the quad's content.
    pub color_texture: ChainId,
    /// Pixel viewport within the chain.
    pub viewport: Viewport,
    /// Pose of the quad's center, in tracking space (or head space when
    /// head-locked).
    pub pose: Posef,
    /// Physical size in meters, `[width, height]`. The host derives height
    /// from the texture aspect, so only width is forwarded.
    pub size_in_meters: [f32; 2],
    /// Layer flags.
    pub flags: LayerFlags,
}

/// Layer kinds this shim accepts but does not composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedKind {
    /// Curved-surface layers.
    Cylinder,
    /// Cube-map skybox layers.
    Cube,
}

/// One entry in a frame's layer list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Layer {
    /// An eye layer with explicit FOV ports.
    EyeFov(EyeFovLayer),
    /// An eye layer with a depth attachment. The depth chains are accepted
    /// and dropped; only the color content is composited.
    EyeFovDepth {
        /// The color content, identical in meaning to [`Layer::EyeFov`].
        color: EyeFovLayer,
        /// Per-eye depth chains. Ignored by this core.
        depth_texture: [Option<ChainId>; 2],
    },
    /// An eye layer with a multiresolution descriptor. The descriptor is not
    /// carried; content is composited at full resolution.
    EyeFovMultires(EyeFovLayer),
    /// An eye layer described by projection matrices.
    EyeMatrix(EyeMatrixLayer),
    /// A flat quad layer.
    Quad(QuadLayer),
    /// A layer kind with no counterpart in the host model. Skipped.
    Unsupported(UnsupportedKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(index: u32) -> ChainId {
        ChainId {
            index,
            generation: 0,
        }
    }

    fn matrix_layer(m00: f32, m11: f32) -> EyeMatrixLayer {
        let mut matrix = Matrix4::IDENTITY;
        matrix.m[0][0] = m00;
        matrix.m[1][1] = m11;
        EyeMatrixLayer {
            color_texture: chain(0),
            right_texture: Some(chain(1)),
            viewport: [Viewport::new(0, 0, 64, 64); 2],
            matrix: [matrix; 2],
            render_pose: [Posef::IDENTITY; 2],
            sensor_sample_time: 0.125,
            flags: LayerFlags {
                texture_origin_at_bottom_left: true,
                ..LayerFlags::default()
            },
        }
    }

    #[test]
    fn unit_scale_matrix_yields_half_tangents() {
        let fov = matrix_layer(1.0, 1.0).to_fov_layer().fov[0];
        assert_eq!(fov.left_tan, 0.5);
        assert_eq!(fov.right_tan, 0.5);
        assert_eq!(fov.up_tan, 0.5);
        assert_eq!(fov.down_tan, 0.5);
    }

    #[test]
    fn vertical_scale_sign_is_discarded() {
        let fov = matrix_layer(2.0, -1.0).to_fov_layer().fov[0];
        assert_eq!(fov.left_tan, 0.25);
        assert_eq!(fov.up_tan, 0.5);
        assert_eq!(fov.down_tan, 0.5);
    }

    #[test]
    fn conversion_copies_fields_through() {
        let layer = matrix_layer(1.0, 1.0);
        let fov = layer.to_fov_layer();
        assert_eq!(fov.color_texture, layer.color_texture);
        assert_eq!(fov.right_texture, layer.right_texture);
        assert_eq!(fov.viewport, layer.viewport);
        assert_eq!(fov.render_pose, layer.render_pose);
        assert_eq!(fov.sensor_sample_time, layer.sensor_sample_time);
        assert_eq!(fov.flags, layer.flags);
    }

    #[test]
    fn missing_right_texture_reuses_left() {
        let mut layer = matrix_layer(1.0, 1.0).to_fov_layer();
        assert_eq!(layer.chain_for(Eye::Right), chain(1));
        layer.right_texture = None;
        assert_eq!(layer.chain_for(Eye::Left), chain(0));
        assert_eq!(layer.chain_for(Eye::Right), chain(0));
    }
}
