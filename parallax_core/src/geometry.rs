// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure viewport and field-of-view math.
//!
//! Everything in this module is a plain function over plain values: pixel
//! viewports become normalized texture bounds, FOV tangent pairs become crop
//! rectangles, and pairs of FOV ports become the placement quads the blit
//! compositor hands to the graphics backend. No handles, no host calls.
//!
//! Vertical flips deserve a note: a layer may declare a bottom-left texture
//! origin, and the graphics backend may independently report that its native
//! origin convention requires a flip. Each condition applies `v' = 1 − v` to
//! both vertical bounds, so the two conditions cancel when both hold.

/// A pixel-space viewport within a swap-chain texture.
///
/// Coordinates follow the guest SDK: `x`/`y` is the top-left corner unless
/// the layer's bottom-left-origin flag says otherwise, and the fields are
/// signed because producers hand us whatever they were given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Viewport {
    /// Creates a viewport from position and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Normalized UV bounds within a texture.
///
/// Unlike an axis-aligned rectangle type, `v_min > v_max` is a legal state:
/// it is how a vertical flip is expressed to the host runtime. Do not
/// normalize these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureBounds {
    /// Minimum U coordinate.
    pub u_min: f32,
    /// Minimum V coordinate (before any flip).
    pub v_min: f32,
    /// Maximum U coordinate.
    pub u_max: f32,
    /// Maximum V coordinate (before any flip).
    pub v_max: f32,
}

impl TextureBounds {
    /// The full texture, `(0,0)-(1,1)`.
    pub const FULL: Self = Self {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 1.0,
        v_max: 1.0,
    };

    /// Returns these bounds with both vertical coordinates flipped as
    /// `v' = 1 − v`.
    ///
    /// Applying this twice is an identity.
    #[inline]
    #[must_use]
    pub fn flipped_v(self) -> Self {
        Self {
            v_min: 1.0 - self.v_min,
            v_max: 1.0 - self.v_max,
            ..self
        }
    }

    /// Composes viewport bounds with FOV-crop bounds multiplicatively.
    ///
    /// `self` is the viewport rectangle within the texture; `fov` is the crop
    /// produced by [`fov_crop_bounds`]. The minimum edges shift by the crop's
    /// minimum scaled into the viewport's extent, the maximum edges scale
    /// down by the crop's maximum.
    #[inline]
    #[must_use]
    pub fn composed_with(self, fov: Self) -> Self {
        Self {
            u_min: self.u_min + fov.u_min * self.u_max,
            u_max: self.u_max * fov.u_max,
            v_min: self.v_min + fov.v_min * self.v_max,
            v_max: self.v_max * fov.v_max,
        }
    }
}

/// Field-of-view half-angle tangents for one eye.
///
/// All four tangents are positive distances from the optical axis to the
/// named frustum edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FovPort {
    /// Tangent of the half-angle to the left edge.
    pub left_tan: f32,
    /// Tangent of the half-angle to the right edge.
    pub right_tan: f32,
    /// Tangent of the half-angle to the top edge.
    pub up_tan: f32,
    /// Tangent of the half-angle to the bottom edge.
    pub down_tan: f32,
}

impl FovPort {
    /// Creates a symmetric FOV port from horizontal and vertical tangents.
    #[inline]
    #[must_use]
    pub const fn symmetric(horizontal_tan: f32, vertical_tan: f32) -> Self {
        Self {
            left_tan: horizontal_tan,
            right_tan: horizontal_tan,
            up_tan: vertical_tan,
            down_tan: vertical_tan,
        }
    }
}

/// Per-edge placement of one layer's frustum within another's, for blit
/// compositing.
///
/// Each field is the source layer's tangent for that edge divided by the
/// destination (base) layer's tangent for the same edge. All four fractions
/// are positive, and a fraction of `1.0` means the source edge coincides
/// with the base frustum edge; fractions below `1.0` mean the source content
/// fits inside the base FOV on that side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FovPlacement {
    /// Left-edge fraction.
    pub left: f32,
    /// Right-edge fraction.
    pub right: f32,
    /// Top-edge fraction.
    pub up: f32,
    /// Bottom-edge fraction.
    pub down: f32,
}

impl FovPlacement {
    /// Computes the placement of `extra`'s frustum within `base`'s.
    #[inline]
    #[must_use]
    pub fn between(base: FovPort, extra: FovPort) -> Self {
        Self {
            left: extra.left_tan / base.left_tan,
            right: extra.right_tan / base.right_tan,
            up: extra.up_tan / base.up_tan,
            down: extra.down_tan / base.down_tan,
        }
    }
}

/// Normalizes a pixel viewport against a chain's dimensions.
///
/// Degenerate viewports (width or height ≤ 0, seen from producers that never
/// initialize the field) fall back to the full texture before flips are
/// applied. `bottom_left_origin` is the layer's flag; `backend_flips_v` is
/// the graphics backend's own origin convention. Both conditions flip, so
/// together they cancel.
#[must_use]
pub fn viewport_to_bounds(
    viewport: Viewport,
    chain_width: u32,
    chain_height: u32,
    bottom_left_origin: bool,
    backend_flips_v: bool,
) -> TextureBounds {
    let w = chain_width as f32;
    let h = chain_height as f32;

    let mut bounds = if viewport.width > 0 && viewport.height > 0 {
        TextureBounds {
            u_min: viewport.x as f32 / w,
            v_min: viewport.y as f32 / h,
            u_max: (viewport.x + viewport.width) as f32 / w,
            v_max: (viewport.y + viewport.height) as f32 / h,
        }
    } else {
        TextureBounds::FULL
    };

    if bottom_left_origin {
        bounds = bounds.flipped_v();
    }
    if backend_flips_v {
        bounds = bounds.flipped_v();
    }

    bounds
}

/// Computes the bounds that crop content rendered with `content` FOV down to
/// the `display` FOV (or expand past it, if the displayed FOV is wider).
///
/// Both FOV ports are assumed to share a common optical center; skewed
/// lenses are not supported.
#[must_use]
pub fn fov_crop_bounds(display: FovPort, content: FovPort) -> TextureBounds {
    TextureBounds {
        u_min: 0.5 - 0.5 * display.left_tan / content.left_tan,
        u_max: 0.5 + 0.5 * display.right_tan / content.right_tan,
        v_min: 0.5 - 0.5 * display.up_tan / content.up_tan,
        v_max: 0.5 + 0.5 * display.down_tan / content.down_tan,
    }
}
