// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The caller-facing frame compositor.
//!
//! [`Compositor`] owns the graphics backend, the host runtime binding, the
//! swap-chain store, the single mirror-surface slot, the overlay manager,
//! and the frame pacer. Per frame it performs one left-to-right pass over
//! the submitted layers: quad layers go to their overlays, the first eye
//! layer becomes the **base layer**, and every further eye layer is
//! blit-composited onto the base — only one stereo submission ever reaches
//! the host per frame.
//!
//! All caller-facing operations return the unified codes of
//! [`result`](crate::result); host enumerators never leak through.

use core::fmt;

use crate::backend::{GraphicsBackend, TextureApi};
use crate::chain::{
    BindFlags, ChainId, ChainStore, DEFAULT_CHAIN_LENGTH, MirrorDesc, MirrorId, MirrorSurface,
    MiscFlags, TextureDesc, TextureKind, TextureSwapChain,
};
use crate::eye::Eye;
use crate::geometry::{FovPlacement, fov_crop_bounds, viewport_to_bounds};
use crate::host::{HostRuntime, OverlayHandle, SubmitFlags, TrackingOrigin};
use crate::layer::{EyeFovLayer, Layer, QuadLayer};
use crate::overlay::OverlayManager;
use crate::pacer::{FramePacer, PacerState};
use crate::result::{CompositorError, FrameOutcome, FrameResult, translate};
use crate::session::Session;
use crate::trace::{BeginEvent, EndFrameEvent, SceneSubmitEvent, TraceSink, Tracer, WaitEvent};
use crate::transform::Matrix34;

/// Tunables that rarely change.
#[derive(Clone, Copy, Debug)]
pub struct CompositorOptions {
    /// Prefix for the process-unique overlay keys; the creation counter is
    /// appended.
    pub overlay_key_prefix: &'static str,
    /// Human-readable name given to created overlays.
    pub overlay_display_name: &'static str,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            overlay_key_prefix: "parallax.layer",
            overlay_display_name: "Parallax Layer",
        }
    }
}

/// The frame compositor for one session.
///
/// `B` is the graphics backend, `R` the host runtime binding. All methods
/// run on the caller's thread; the only suspension point is the blocking
/// pose wait inside [`wait_to_begin_frame`](Self::wait_to_begin_frame).
pub struct Compositor<B, R> {
    backend: B,
    runtime: R,
    options: CompositorOptions,
    chains: ChainStore,
    mirror: Option<MirrorSurface>,
    mirror_generation: u32,
    overlays: OverlayManager,
    pacer: FramePacer,
    tracer: Tracer,
}

impl<B: GraphicsBackend, R: HostRuntime> Compositor<B, R> {
    /// Creates a compositor with default [`CompositorOptions`].
    #[must_use]
    pub fn new(backend: B, runtime: R) -> Self {
        Self::with_options(backend, runtime, CompositorOptions::default())
    }

    /// Creates a compositor with explicit options.
    #[must_use]
    pub fn with_options(backend: B, runtime: R, options: CompositorOptions) -> Self {
        Self {
            backend,
            runtime,
            options,
            chains: ChainStore::new(),
            mirror: None,
            mirror_generation: 0,
            overlays: OverlayManager::new(),
            pacer: FramePacer::new(),
            tracer: Tracer::none(),
        }
    }

    /// Installs a trace sink for frame-loop instrumentation.
    ///
    /// Only effective with the `trace` cargo feature; without it the sink is
    /// dropped and every emission compiles to nothing.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// The host runtime binding.
    #[must_use]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Mutable access to the host runtime binding.
    #[must_use]
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// The graphics backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the graphics backend.
    #[must_use]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Resolves a swap-chain handle.
    #[must_use]
    pub fn chain(&self, id: ChainId) -> Option<&TextureSwapChain> {
        self.chains.get(id)
    }

    /// The mirror surface, if one exists.
    #[must_use]
    pub fn mirror(&self) -> Option<&MirrorSurface> {
        self.mirror.as_ref()
    }

    /// Where the pacer currently is in the frame cycle.
    #[must_use]
    pub fn pacer_state(&self) -> PacerState {
        self.pacer.state()
    }

    /// Creates a swap chain of ring textures for the given descriptor.
    ///
    /// The ring length is [`DEFAULT_CHAIN_LENGTH`], forced to 1 on OpenGL
    /// backends: the host's asynchronous reprojection fails with
    /// multi-buffer GL chains. On texture-creation failure nothing is
    /// retained and no handle is issued.
    pub fn create_texture_swap_chain(
        &mut self,
        desc: &TextureDesc,
    ) -> Result<ChainId, CompositorError> {
        let length = if self.backend.api() == TextureApi::OpenGl {
            1
        } else {
            DEFAULT_CHAIN_LENGTH
        };

        let mut textures = Vec::with_capacity(length);
        for _ in 0..length {
            match self.backend.create_texture(desc) {
                Ok(texture) => textures.push(texture),
                Err(error) => {
                    log::warn!("swap chain texture creation failed: {error}");
                    return Err(CompositorError::Runtime);
                }
            }
        }

        Ok(self.chains.insert(*desc, textures))
    }

    /// Destroys a swap chain.
    ///
    /// Any host overlay cached on the chain is not released; see
    /// [`ChainStore::remove`](crate::chain::ChainStore).
    pub fn destroy_texture_swap_chain(&mut self, id: ChainId) -> Result<(), CompositorError> {
        if self.chains.remove(id) {
            Ok(())
        } else {
            Err(CompositorError::TextureSwapChainInvalid)
        }
    }

    /// Creates the mirror surface for on-screen preview.
    ///
    /// There can only be one mirror surface at a time; creating a second
    /// without destroying the first fails and leaves the first untouched.
    pub fn create_mirror_surface(
        &mut self,
        desc: &MirrorDesc,
    ) -> Result<MirrorId, CompositorError> {
        if self.mirror.is_some() {
            return Err(CompositorError::Runtime);
        }

        let texture_desc = TextureDesc {
            kind: TextureKind::TwoD,
            format: desc.format,
            width: desc.width,
            height: desc.height,
            mip_levels: 1,
            array_size: 1,
            sample_count: 1,
            bind_flags: BindFlags {
                render_target: true,
                depth_stencil: false,
                unordered_access: false,
            },
            misc_flags: MiscFlags {
                allow_generate_mips: true,
                ..desc.misc_flags
            },
        };
        let texture = match self.backend.create_texture(&texture_desc) {
            Ok(texture) => texture,
            Err(error) => {
                log::warn!("mirror texture creation failed: {error}");
                return Err(CompositorError::Runtime);
            }
        };

        self.mirror = Some(MirrorSurface::new(*desc, texture));
        Ok(MirrorId {
            generation: self.mirror_generation,
        })
    }

    /// Destroys the mirror surface.
    pub fn destroy_mirror_surface(&mut self, id: MirrorId) -> Result<(), CompositorError> {
        if self.mirror.is_some() && id.generation == self.mirror_generation {
            self.mirror = None;
            self.mirror_generation += 1;
            Ok(())
        } else {
            Err(CompositorError::InvalidParameter)
        }
    }

    /// Blocks until the session may begin frame `frame_index`.
    ///
    /// Reproduces the guest SDK's queue-ahead pacing: one blocking host pose
    /// wait per frame of deficit. Fails only if the underlying wait
    /// primitive fails.
    pub fn wait_to_begin_frame(&mut self, session: &Session, frame_index: u64) -> FrameResult {
        let waits = frame_index.saturating_sub(session.frame_index());
        let result = self
            .pacer
            .wait_to_begin(&mut self.runtime, session, frame_index);
        self.tracer.frame_wait(&WaitEvent {
            target_index: frame_index,
            waits_issued: waits,
        });
        translate(result)
    }

    /// Records `frame_index` on the session. Never blocks.
    pub fn begin_frame(&mut self, session: &Session, frame_index: u64) -> FrameResult {
        self.pacer.begin(session, frame_index);
        self.tracer.frame_begin(&BeginEvent { frame_index });
        Ok(FrameOutcome::Visible)
    }

    /// Submits a frame's layers.
    ///
    /// Fails fast with [`CompositorError::InvalidParameter`] on an empty
    /// layer list, before any work. Otherwise: flushes application GPU work,
    /// walks the layers left to right (`None` entries skipped, unsupported
    /// kinds ignored), shows quad layers through overlays, merges eye layers
    /// into a single base submission, reconciles overlay visibility, submits
    /// the base layer, and refreshes the mirror surface unless a hard error
    /// occurred.
    ///
    /// Every chain that participated — quad, base, or blitted extra — has
    /// its cursor advanced exactly once.
    pub fn end_frame(&mut self, session: &Session, layers: &[Option<&Layer>]) -> FrameResult {
        if layers.is_empty() {
            return Err(CompositorError::InvalidParameter);
        }

        // All application draw calls must land before any chain is read.
        self.backend.flush();

        let mut base: Option<EyeFovLayer> = None;
        let mut active: Vec<OverlayHandle> = Vec::new();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "layer lists are bounded far below u32::MAX"
        )]
        for (position, entry) in layers.iter().enumerate() {
            let Some(layer) = entry else { continue };
            match layer {
                Layer::Quad(quad) => {
                    self.show_quad_layer(session, quad, position as u32, &mut active)?;
                }
                Layer::EyeFov(eye) | Layer::EyeFovMultires(eye) => {
                    self.merge_eye_layer(&mut base, eye)?;
                }
                Layer::EyeFovDepth { color, .. } => {
                    self.merge_eye_layer(&mut base, color)?;
                }
                Layer::EyeMatrix(matrix) => {
                    let eye = matrix.to_fov_layer();
                    self.merge_eye_layer(&mut base, &eye)?;
                }
                Layer::Unsupported(kind) => {
                    log::debug!("ignoring unsupported {kind:?} layer");
                }
            }
        }

        let active_count = active.len();
        self.overlays.reconcile(&mut self.runtime, active);

        let base_found = base.is_some();
        let result = match base {
            Some(layer) => self.submit_scene_layer(session, &layer),
            None => Ok(FrameOutcome::Visible),
        };

        // Soft successes still refresh the preview; only hard errors skip it.
        if result.is_ok()
            && let Some(mirror) = &mut self.mirror
        {
            self.backend.render_mirror(mirror.texture_mut());
        }

        self.tracer.end_frame(&EndFrameEvent {
            frame_index: session.frame_index(),
            layer_count: layers.len(),
            active_overlays: active_count,
            base_layer_found: base_found,
        });
        self.pacer.finish();
        result
    }

    /// Routes one quad layer to its overlay and advances its chain.
    fn show_quad_layer(
        &mut self,
        session: &Session,
        quad: &QuadLayer,
        sort_order: u32,
        active: &mut Vec<OverlayHandle>,
    ) -> Result<(), CompositorError> {
        let chain = self
            .chains
            .get(quad.color_texture)
            .ok_or(CompositorError::TextureSwapChainInvalid)?;

        let Some(overlay) = self.overlays.get_or_create(
            &mut self.runtime,
            chain,
            self.options.overlay_key_prefix,
            self.options.overlay_display_name,
        ) else {
            // Creation failed (and was logged); the chain keeps its current
            // buffer so the next frame can retry with the same content.
            return Ok(());
        };

        self.overlays.update(
            &mut self.runtime,
            chain,
            quad,
            overlay,
            sort_order,
            session.tracking_origin(),
            self.backend.api().origin_at_bottom_left(),
        );
        active.push(overlay);
        chain.submit();
        Ok(())
    }

    /// Adopts the first eye layer as the base; blits every further one onto
    /// it.
    fn merge_eye_layer(
        &mut self,
        base: &mut Option<EyeFovLayer>,
        layer: &EyeFovLayer,
    ) -> Result<(), CompositorError> {
        match base {
            None => *base = Some(*layer),
            Some(dst) => self.blit_fov_layers(dst, layer)?,
        }
        Ok(())
    }

    /// Blit-composites `src` onto `dst` for both eyes and advances `src`'s
    /// chains.
    ///
    /// The source chains never reach the host directly, but they still must
    /// free their current buffer for the next frame's render.
    fn blit_fov_layers(
        &mut self,
        dst: &EyeFovLayer,
        src: &EyeFovLayer,
    ) -> Result<(), CompositorError> {
        for eye in Eye::BOTH {
            let i = eye.index();
            let src_chain = self
                .chains
                .get(src.chain_for(eye))
                .ok_or(CompositorError::TextureSwapChainInvalid)?;
            let dst_chain = self
                .chains
                .get(dst.chain_for(eye))
                .ok_or(CompositorError::TextureSwapChainInvalid)?;

            let placement = FovPlacement::between(dst.fov[i], src.fov[i]);
            let src_bounds = viewport_to_bounds(
                src.viewport[i],
                src_chain.desc().width,
                src_chain.desc().height,
                src.flags.texture_origin_at_bottom_left,
                self.backend.api().origin_at_bottom_left(),
            );
            self.backend.blit_layer(
                eye,
                src_chain.current_texture(),
                src_bounds,
                dst_chain.current_texture(),
                dst.viewport[i],
                placement,
            );
        }

        let left = src.chain_for(Eye::Left);
        let right = src.chain_for(Eye::Right);
        self.chains
            .get(left)
            .ok_or(CompositorError::TextureSwapChainInvalid)?
            .submit();
        if right != left {
            self.chains
                .get(right)
                .ok_or(CompositorError::TextureSwapChainInvalid)?
                .submit();
        }
        Ok(())
    }

    /// Submits the base layer to the host scene, one eye at a time.
    fn submit_scene_layer(&mut self, session: &Session, layer: &EyeFovLayer) -> FrameResult {
        let left_id = layer.chain_for(Eye::Left);
        let right_id = layer.chain_for(Eye::Right);

        let mut host_result = Ok(());
        for eye in Eye::BOTH {
            let i = eye.index();
            let chain = self
                .chains
                .get(layer.chain_for(eye))
                .ok_or(CompositorError::TextureSwapChainInvalid)?;

            // One snapshot per eye; all math below uses it exclusively, so a
            // concurrent descriptor update cannot tear the bounds.
            let render_desc = session.eye_render_desc(eye);

            let viewport_bounds = viewport_to_bounds(
                layer.viewport[i],
                chain.desc().width,
                chain.desc().height,
                layer.flags.texture_origin_at_bottom_left,
                self.backend.api().origin_at_bottom_left(),
            );
            let crop = fov_crop_bounds(render_desc.fov, layer.fov[i]);
            let bounds = viewport_bounds.composed_with(crop);

            let mut texture = chain.current_texture().to_host_texture();
            let pose = Matrix34::from_pose(layer.render_pose[i]);
            texture.pose = match session.tracking_origin() {
                TrackingOrigin::Seated => self.runtime.seated_to_standing_pose() * pose,
                TrackingOrigin::Standing => pose,
            };

            host_result = self.runtime.submit(
                eye,
                &texture,
                bounds,
                SubmitFlags {
                    texture_with_pose: true,
                },
            );
            if translate(host_result).is_err() {
                // Hard error on the left eye aborts before the right.
                break;
            }
        }

        let left = self
            .chains
            .get(left_id)
            .ok_or(CompositorError::TextureSwapChainInvalid)?;
        let right = self
            .chains
            .get(right_id)
            .ok_or(CompositorError::TextureSwapChainInvalid)?;
        self.tracer.scene_submit(&SceneSubmitEvent {
            left_chain_serial: left.serial(),
            right_chain_serial: right.serial(),
            left_submit_index: left.submit_index(),
            right_submit_index: right.submit_index(),
        });

        // Both eyes' chains advance exactly once each, submitted or not.
        left.submit();
        if right_id != left_id {
            right.submit();
        }

        translate(host_result)
    }
}

impl<B, R> fmt::Debug for Compositor<B, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("options", &self.options)
            .field("chains", &self.chains)
            .field("mirror", &self.mirror)
            .field("overlays", &self.overlays)
            .field("pacer", &self.pacer)
            .finish_non_exhaustive()
    }
}
