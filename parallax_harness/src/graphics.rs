// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording in-memory graphics backend.

use core::any::Any;

use parallax_core::backend::{
    BackendError, GraphicsBackend, HostTexture, TextureApi, TextureResource,
};
use parallax_core::chain::TextureDesc;
use parallax_core::eye::Eye;
use parallax_core::geometry::{FovPlacement, TextureBounds, Viewport};
use parallax_core::transform::Matrix34;

/// A texture that exists only as a numbered handle.
#[derive(Debug)]
pub struct FakeTexture {
    /// Process-unique handle, assigned by [`FakeGraphics`] starting at 1.
    pub handle: u64,
    /// The API the owning backend claims to drive.
    pub api: TextureApi,
    /// The descriptor the texture was created with.
    pub desc: TextureDesc,
}

impl TextureResource for FakeTexture {
    fn to_host_texture(&self) -> HostTexture {
        HostTexture {
            handle: self.handle,
            api: self.api,
            pose: Matrix34::IDENTITY,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One recorded [`GraphicsBackend::blit_layer`] call.
#[derive(Clone, Copy, Debug)]
pub struct BlitRecord {
    /// Which eye was composited.
    pub eye: Eye,
    /// Handle of the source texture.
    pub src_handle: u64,
    /// Source UV bounds.
    pub src_bounds: TextureBounds,
    /// Handle of the destination texture.
    pub dst_handle: u64,
    /// Destination pixel viewport.
    pub dst_viewport: Viewport,
    /// Frustum placement of the source within the destination.
    pub placement: FovPlacement,
}

/// A [`GraphicsBackend`] that creates [`FakeTexture`]s and records every
/// call.
#[derive(Debug)]
pub struct FakeGraphics {
    api: TextureApi,
    next_handle: u64,
    /// When set, texture creation fails until cleared.
    pub fail_creation: bool,
    /// Descriptors of every texture created.
    pub created: Vec<TextureDesc>,
    /// Number of [`flush`](GraphicsBackend::flush) calls.
    pub flushes: u32,
    /// Every blit, in call order.
    pub blits: Vec<BlitRecord>,
    /// Target-texture handle of every mirror refresh, in call order.
    pub mirror_renders: Vec<u64>,
}

impl FakeGraphics {
    /// Creates a backend claiming to drive `api`.
    #[must_use]
    pub fn new(api: TextureApi) -> Self {
        Self {
            api,
            next_handle: 1,
            fail_creation: false,
            created: Vec::new(),
            flushes: 0,
            blits: Vec::new(),
            mirror_renders: Vec::new(),
        }
    }
}

impl GraphicsBackend for FakeGraphics {
    fn api(&self) -> TextureApi {
        self.api
    }

    fn create_texture(
        &mut self,
        desc: &TextureDesc,
    ) -> Result<Box<dyn TextureResource>, BackendError> {
        if self.fail_creation {
            return Err(BackendError::new("texture creation disabled"));
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.created.push(*desc);
        Ok(Box::new(FakeTexture {
            handle,
            api: self.api,
            desc: *desc,
        }))
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn blit_layer(
        &mut self,
        eye: Eye,
        src: &dyn TextureResource,
        src_bounds: TextureBounds,
        dst: &dyn TextureResource,
        dst_viewport: Viewport,
        placement: FovPlacement,
    ) {
        self.blits.push(BlitRecord {
            eye,
            src_handle: src.to_host_texture().handle,
            src_bounds,
            dst_handle: dst.to_host_texture().handle,
            dst_viewport,
            placement,
        });
    }

    fn render_mirror(&mut self, target: &mut dyn TextureResource) {
        self.mirror_renders.push(target.to_host_texture().handle);
    }
}
