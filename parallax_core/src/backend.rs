// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graphics backend contract.
//!
//! Parallax splits graphics-API-specific work into *backend* crates. A
//! backend provides texture creation, the end-of-frame flush, the
//! sub-rectangle blit used to merge extra eye layers into the base layer,
//! and the mirror-surface refresh. The core never encodes GPU commands; it
//! only decides *what* to copy *where*, in normalized coordinates.
//!
//! Backends also carry one piece of policy the geometry math needs: whether
//! the API's native texture origin sits at the bottom-left
//! ([`TextureApi::origin_at_bottom_left`]), which adds a vertical flip to
//! every bounds computation.

use core::any::Any;
use thiserror::Error;

use crate::chain::TextureDesc;
use crate::eye::Eye;
use crate::geometry::{FovPlacement, TextureBounds, Viewport};
use crate::transform::Matrix34;

/// The graphics API a backend drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureApi {
    /// Direct3D 11.
    D3D11,
    /// Direct3D 12.
    D3D12,
    /// OpenGL.
    OpenGl,
    /// Vulkan.
    Vulkan,
}

impl TextureApi {
    /// Whether this API's native texture origin is at the bottom-left,
    /// requiring a vertical flip of texture bounds.
    #[inline]
    #[must_use]
    pub const fn origin_at_bottom_left(self) -> bool {
        matches!(self, Self::OpenGl)
    }
}

/// A texture handle in the form the host runtime accepts, with its pose
/// slot.
///
/// The handle value is backend-specific (a D3D resource pointer, a GL
/// texture name, ...) and is passed through to the host uninterpreted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostTexture {
    /// Backend-specific native handle, as the host runtime expects it.
    pub handle: u64,
    /// Which graphics API the handle belongs to.
    pub api: TextureApi,
    /// Device-to-absolute-tracking pose associated with the texture
    /// contents. Identity until scene submission fills it in.
    pub pose: Matrix34,
}

/// Error from the graphics backend while creating or copying textures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("graphics backend failure: {0}")]
pub struct BackendError(pub String);

impl BackendError {
    /// Creates an error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// An opaque GPU-backed image owned by a swap chain or the mirror surface.
pub trait TextureResource {
    /// Returns the host-runtime view of this texture with an identity pose
    /// slot.
    fn to_host_texture(&self) -> HostTexture;

    /// Upcast for backends that need their concrete texture type back inside
    /// [`GraphicsBackend::blit_layer`] and
    /// [`GraphicsBackend::render_mirror`].
    fn as_any(&self) -> &dyn Any;
}

/// Graphics-API-specific texture creation, copying, and flushing.
///
/// One backend instance serves one compositor. All methods are called from
/// the frame-submission thread only.
pub trait GraphicsBackend {
    /// The graphics API this backend drives.
    fn api(&self) -> TextureApi;

    /// Creates and initializes a texture for the given descriptor.
    ///
    /// Failure must leave no backend state behind; the compositor discards
    /// everything it built for the containing chain.
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn TextureResource>, BackendError>;

    /// Flushes all GPU work the application queued for this frame.
    ///
    /// Called exactly once per `end_frame`, before any swap-chain contents
    /// are read.
    fn flush(&mut self);

    /// Blits `src` into `dst` for one eye.
    ///
    /// `src_bounds` selects the source sub-rectangle in UV space (vertical
    /// flips already folded in). `dst_viewport` is the destination layer's
    /// pixel viewport, and `placement` positions the source frustum within
    /// the destination frustum per [`FovPlacement`]'s all-positive edge
    /// fractions.
    fn blit_layer(
        &mut self,
        eye: Eye,
        src: &dyn TextureResource,
        src_bounds: TextureBounds,
        dst: &dyn TextureResource,
        dst_viewport: Viewport,
        placement: FovPlacement,
    );

    /// Refreshes the mirror surface from the most recently submitted frame.
    fn render_mirror(&mut self, target: &mut dyn TextureResource);
}
