// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording fakes for the two `parallax_core` boundaries.
//!
//! [`graphics::FakeGraphics`] stands in for a graphics backend: it mints
//! numbered texture handles and records creations, flushes, blits, and
//! mirror refreshes. [`runtime::FakeRuntime`] stands in for the host
//! compositor runtime: every operation is recorded in call order and returns
//! a scriptable result, so tests can drive both the happy path and host
//! error paths without a headset attached.
//!
//! The tests in this crate exercise the full frame loop
//! (`wait_to_begin_frame` → `begin_frame` → `end_frame`) through
//! `parallax_core`'s public API.

pub mod graphics;
pub mod runtime;

#[cfg(test)]
mod tests {
    use crate::graphics::FakeGraphics;
    use crate::runtime::{FakeRuntime, TransformRecord};

    use parallax_core::backend::TextureApi;
    use parallax_core::chain::{ChainId, MirrorDesc, MiscFlags, TextureDesc, TextureFormat};
    use parallax_core::compositor::Compositor;
    use parallax_core::eye::Eye;
    use parallax_core::geometry::{FovPort, TextureBounds, Viewport};
    use parallax_core::host::{OverlayHandle, TrackedDeviceIndex, TrackingOrigin};
    use parallax_core::layer::{
        EyeFovLayer, EyeMatrixLayer, Layer, LayerFlags, QuadLayer, UnsupportedKind,
    };
    use parallax_core::pacer::PacerState;
    use parallax_core::result::{CompositorError, FrameOutcome, HostError};
    use parallax_core::session::{EyeRenderDesc, Session};
    use parallax_core::transform::{Matrix34, Matrix4, Posef, Quat, Vector3};

    type TestCompositor = Compositor<FakeGraphics, FakeRuntime>;

    fn compositor(api: TextureApi) -> TestCompositor {
        Compositor::new(FakeGraphics::new(api), FakeRuntime::new())
    }

    fn session(origin: TrackingOrigin) -> Session {
        Session::new(
            origin,
            [
                EyeRenderDesc {
                    eye: Eye::Left,
                    fov: FovPort::symmetric(1.0, 1.0),
                },
                EyeRenderDesc {
                    eye: Eye::Right,
                    fov: FovPort::symmetric(1.0, 1.0),
                },
            ],
        )
    }

    fn color_desc() -> TextureDesc {
        TextureDesc::color_2d(TextureFormat::Rgba8UnormSrgb, 256, 128)
    }

    fn eye_layer(left: ChainId, right: Option<ChainId>) -> EyeFovLayer {
        EyeFovLayer {
            color_texture: left,
            right_texture: right,
            viewport: [Viewport::new(0, 0, 256, 128); 2],
            fov: [FovPort::symmetric(1.0, 1.0); 2],
            render_pose: [Posef::IDENTITY; 2],
            sensor_sample_time: 0.0,
            flags: LayerFlags::default(),
        }
    }

    fn quad_layer(chain: ChainId) -> QuadLayer {
        QuadLayer {
            color_texture: chain,
            viewport: Viewport::new(0, 0, 256, 128),
            pose: Posef::IDENTITY,
            size_in_meters: [0.8, 0.5],
            flags: LayerFlags::default(),
        }
    }

    #[test]
    fn empty_layer_list_fails_fast() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        assert_eq!(
            comp.end_frame(&session, &[]),
            Err(CompositorError::InvalidParameter)
        );
        // No work at all: not even the flush ran, and no cursor moved.
        assert_eq!(comp.backend().flushes, 0);
        assert!(comp.runtime().submits.is_empty());
        assert_eq!(comp.chain(chain).unwrap().submit_index(), 0);
    }

    #[test]
    fn two_eye_layers_yield_one_scene_submission() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let base_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        let extra_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let base = Layer::EyeFov(eye_layer(base_chain, None));
        let extra = Layer::EyeFov({
            let mut layer = eye_layer(extra_chain, None);
            layer.fov = [FovPort::symmetric(0.5, 0.5); 2];
            layer
        });

        let result = comp.end_frame(&session, &[Some(&base), Some(&extra)]);
        assert_eq!(result, Ok(FrameOutcome::Visible));

        // Exactly one stereo submission: two eyes, not four.
        assert_eq!(comp.runtime().submits.len(), 2);
        assert_eq!(comp.runtime().submits[0].eye, Eye::Left);
        assert_eq!(comp.runtime().submits[1].eye, Eye::Right);
        assert!(comp.runtime().submits[0].flags.texture_with_pose);

        // The extra layer was blit-composited per eye at half placement.
        assert_eq!(comp.backend().blits.len(), 2);
        assert_eq!(comp.backend().blits[0].placement.left, 0.5);
        assert_eq!(comp.backend().blits[0].placement.down, 0.5);
        assert_eq!(comp.backend().flushes, 1);

        // Every participating chain advanced exactly once.
        assert_eq!(comp.chain(base_chain).unwrap().submit_index(), 1);
        assert_eq!(comp.chain(extra_chain).unwrap().submit_index(), 1);
    }

    #[test]
    fn matrix_layer_becomes_the_base_layer() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let layer = Layer::EyeMatrix(EyeMatrixLayer {
            color_texture: chain,
            right_texture: None,
            viewport: [Viewport::new(0, 0, 256, 128); 2],
            matrix: [Matrix4::IDENTITY; 2],
            render_pose: [Posef::IDENTITY; 2],
            sensor_sample_time: 0.0,
            flags: LayerFlags::default(),
        });

        assert_eq!(
            comp.end_frame(&session, &[Some(&layer)]),
            Ok(FrameOutcome::Visible)
        );
        assert_eq!(comp.runtime().submits.len(), 2);
        assert!(comp.backend().blits.is_empty());
    }

    #[test]
    fn depth_layer_composites_its_color_content() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let layer = Layer::EyeFovDepth {
            color: eye_layer(chain, None),
            depth_texture: [None, None],
        };
        assert_eq!(
            comp.end_frame(&session, &[Some(&layer)]),
            Ok(FrameOutcome::Visible)
        );
        assert_eq!(comp.runtime().submits.len(), 2);
    }

    #[test]
    fn shared_texture_shortcut_deduplicates_cursor_advance() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let base = Layer::EyeFov(eye_layer(chain, None));
        comp.end_frame(&session, &[Some(&base)]).unwrap();

        // Both eyes submitted the same texture; the chain advanced once.
        assert_eq!(comp.runtime().submits[0].handle, comp.runtime().submits[1].handle);
        assert_eq!(comp.chain(chain).unwrap().submit_index(), 1);
    }

    #[test]
    fn fov_crop_composes_into_submitted_bounds() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        // Content rendered at twice the displayed FOV crops to the middle
        // half in both axes.
        let base = Layer::EyeFov({
            let mut layer = eye_layer(chain, None);
            layer.fov = [FovPort::symmetric(2.0, 2.0); 2];
            layer
        });
        comp.end_frame(&session, &[Some(&base)]).unwrap();

        let bounds = comp.runtime().submits[0].bounds;
        assert_eq!(
            bounds,
            TextureBounds {
                u_min: 0.25,
                v_min: 0.25,
                u_max: 0.75,
                v_max: 0.75,
            }
        );
    }

    #[test]
    fn quad_layer_drives_its_overlay() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let quad_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        let eye_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let quad = Layer::Quad(quad_layer(quad_chain));
        let base = Layer::EyeFov(eye_layer(eye_chain, None));
        comp.end_frame(&session, &[Some(&quad), Some(&base)]).unwrap();

        let overlay = OverlayHandle(1);
        let rt = comp.runtime();
        assert_eq!(
            rt.created_overlays,
            vec![("parallax.layer0".to_owned(), "Parallax Layer".to_owned())]
        );
        assert_eq!(rt.sort_orders, vec![(overlay, 0)]);
        assert_eq!(rt.widths, vec![(overlay, 0.8)]);
        assert!(matches!(
            rt.transforms[0],
            TransformRecord::Absolute {
                origin: TrackingOrigin::Standing,
                ..
            }
        ));
        // The quad chain was created first, so its front texture is handle 1.
        assert_eq!(rt.overlay_textures, vec![(overlay, 1)]);
        assert_eq!(rt.overlay_bounds[0].1, TextureBounds::FULL);
        assert_eq!(rt.shows, vec![overlay]);

        assert_eq!(comp.chain(quad_chain).unwrap().overlay(), Some(overlay));
        assert_eq!(comp.chain(quad_chain).unwrap().submit_index(), 1);
    }

    #[test]
    fn head_locked_quad_attaches_to_the_hmd() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let quad = Layer::Quad({
            let mut layer = quad_layer(chain);
            layer.flags.head_locked = true;
            layer
        });
        comp.end_frame(&session, &[Some(&quad)]).unwrap();

        assert!(matches!(
            comp.runtime().transforms[0],
            TransformRecord::TrackedDevice {
                device: TrackedDeviceIndex::HMD,
                ..
            }
        ));
    }

    #[test]
    fn vanished_quad_gets_exactly_one_hide() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let quad_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        let eye_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let quad = Layer::Quad(quad_layer(quad_chain));
        let base = Layer::EyeFov(eye_layer(eye_chain, None));

        comp.end_frame(&session, &[Some(&quad), Some(&base)]).unwrap();
        assert_eq!(comp.runtime().shows.len(), 1);

        // The quad disappears: one hide, no further shows.
        comp.end_frame(&session, &[Some(&base)]).unwrap();
        assert_eq!(comp.runtime().hides, vec![OverlayHandle(1)]);
        assert_eq!(comp.runtime().shows.len(), 1);

        // Still gone: no second hide.
        comp.end_frame(&session, &[Some(&base)]).unwrap();
        assert_eq!(comp.runtime().hides.len(), 1);
    }

    #[test]
    fn returning_quad_reuses_its_overlay() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let quad_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        let eye_chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let quad = Layer::Quad(quad_layer(quad_chain));
        let base = Layer::EyeFov(eye_layer(eye_chain, None));

        comp.end_frame(&session, &[Some(&quad), Some(&base)]).unwrap();
        comp.end_frame(&session, &[Some(&base)]).unwrap();
        comp.end_frame(&session, &[Some(&quad), Some(&base)]).unwrap();

        // One creation, two shows, same handle throughout.
        assert_eq!(comp.runtime().created_overlays.len(), 1);
        assert_eq!(
            comp.runtime().shows,
            vec![OverlayHandle(1), OverlayHandle(1)]
        );
    }

    #[test]
    fn overlay_creation_failure_skips_quad_and_retries() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        let quad = Layer::Quad(quad_layer(chain));

        comp.runtime_mut().fail_overlay_creation = true;
        assert_eq!(
            comp.end_frame(&session, &[Some(&quad)]),
            Ok(FrameOutcome::Visible)
        );
        // Nothing cached, nothing shown, and the chain keeps its buffer for
        // the retry.
        assert_eq!(comp.chain(chain).unwrap().overlay(), None);
        assert!(comp.runtime().shows.is_empty());
        assert_eq!(comp.chain(chain).unwrap().submit_index(), 0);

        comp.runtime_mut().fail_overlay_creation = false;
        comp.end_frame(&session, &[Some(&quad)]).unwrap();
        // The key counter moved on even though the first attempt failed.
        assert_eq!(comp.runtime().created_overlays.len(), 2);
        assert_eq!(comp.runtime().created_overlays[1].0, "parallax.layer1");
        assert_eq!(comp.runtime().shows.len(), 1);
        assert_eq!(comp.chain(chain).unwrap().submit_index(), 1);
    }

    #[test]
    fn duplicate_mirror_creation_fails_and_keeps_the_first() {
        let mut comp = compositor(TextureApi::D3D11);
        let first = MirrorDesc {
            format: TextureFormat::Rgba8UnormSrgb,
            width: 800,
            height: 600,
            misc_flags: MiscFlags::default(),
        };
        let second = MirrorDesc { width: 100, ..first };

        let id = comp.create_mirror_surface(&first).unwrap();
        assert_eq!(
            comp.create_mirror_surface(&second),
            Err(CompositorError::Runtime)
        );
        assert_eq!(comp.mirror().unwrap().desc().width, 800);

        comp.destroy_mirror_surface(id).unwrap();
        assert!(comp.mirror().is_none());
        // The released handle is stale from here on.
        comp.create_mirror_surface(&second).unwrap();
        assert_eq!(
            comp.destroy_mirror_surface(id),
            Err(CompositorError::InvalidParameter)
        );
        assert_eq!(comp.mirror().unwrap().desc().width, 100);
    }

    #[test]
    fn mirror_refresh_follows_submission_outcome() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        comp.create_mirror_surface(&MirrorDesc {
            format: TextureFormat::Rgba8UnormSrgb,
            width: 800,
            height: 600,
            misc_flags: MiscFlags::default(),
        })
        .unwrap();
        let base = Layer::EyeFov(eye_layer(chain, None));

        comp.end_frame(&session, &[Some(&base)]).unwrap();
        assert_eq!(comp.backend().mirror_renders.len(), 1);

        // A soft success still refreshes the preview.
        comp.runtime_mut().submit_result = Err(HostError::DoNotHaveFocus);
        assert_eq!(
            comp.end_frame(&session, &[Some(&base)]),
            Ok(FrameOutcome::NotVisible)
        );
        assert_eq!(comp.backend().mirror_renders.len(), 2);

        // A hard error does not, but the chain still advanced.
        comp.runtime_mut().submit_result = Err(HostError::InvalidTexture);
        assert_eq!(
            comp.end_frame(&session, &[Some(&base)]),
            Err(CompositorError::TextureSwapChainInvalid)
        );
        assert_eq!(comp.backend().mirror_renders.len(), 2);
        assert_eq!(comp.chain(chain).unwrap().submit_index(), 1);
    }

    #[test]
    fn queue_ahead_wait_count_matches_the_deficit() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);

        assert_eq!(
            comp.wait_to_begin_frame(&session, 3),
            Ok(FrameOutcome::Visible)
        );
        assert_eq!(comp.runtime().wait_calls, 3);

        comp.begin_frame(&session, 3).unwrap();
        assert_eq!(session.frame_index(), 3);

        comp.wait_to_begin_frame(&session, 4).unwrap();
        assert_eq!(comp.runtime().wait_calls, 4);

        // Not behind: no blocking at all.
        comp.begin_frame(&session, 4).unwrap();
        comp.wait_to_begin_frame(&session, 4).unwrap();
        assert_eq!(comp.runtime().wait_calls, 4);
    }

    #[test]
    fn wait_failures_translate_to_unified_codes() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);

        comp.runtime_mut().wait_result = Err(HostError::IncompatibleVersion);
        assert_eq!(
            comp.wait_to_begin_frame(&session, 1),
            Err(CompositorError::Service)
        );

        comp.runtime_mut().wait_result = Err(HostError::DoNotHaveFocus);
        assert_eq!(
            comp.wait_to_begin_frame(&session, 1),
            Ok(FrameOutcome::NotVisible)
        );
    }

    #[test]
    fn pacer_walks_the_frame_cycle() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        assert_eq!(comp.pacer_state(), PacerState::Idle);
        comp.wait_to_begin_frame(&session, 1).unwrap();
        assert_eq!(comp.pacer_state(), PacerState::Waiting);
        comp.begin_frame(&session, 1).unwrap();
        assert_eq!(comp.pacer_state(), PacerState::InFrame);

        let base = Layer::EyeFov(eye_layer(chain, None));
        comp.end_frame(&session, &[Some(&base)]).unwrap();
        assert_eq!(comp.pacer_state(), PacerState::Idle);
    }

    #[test]
    fn opengl_chains_are_single_buffered() {
        let mut gl = compositor(TextureApi::OpenGl);
        let id = gl.create_texture_swap_chain(&color_desc()).unwrap();
        assert_eq!(gl.chain(id).unwrap().len(), 1);

        let mut dx = compositor(TextureApi::D3D11);
        let id = dx.create_texture_swap_chain(&color_desc()).unwrap();
        assert_eq!(dx.chain(id).unwrap().len(), 2);
    }

    #[test]
    fn seated_origin_composes_the_standing_offset() {
        let mut comp = compositor(TextureApi::D3D11);
        comp.runtime_mut().seated_offset = Matrix34::from_translation(0.0, 1.5, 0.0);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();

        let pose = Posef {
            orientation: Quat::IDENTITY,
            position: Vector3::new(0.5, 0.0, -2.0),
        };
        let base = Layer::EyeFov({
            let mut layer = eye_layer(chain, None);
            layer.render_pose = [pose; 2];
            layer
        });

        let seated = session(TrackingOrigin::Seated);
        comp.end_frame(&seated, &[Some(&base)]).unwrap();
        assert_eq!(
            comp.runtime().submits[0].pose.translation(),
            Vector3::new(0.5, 1.5, -2.0)
        );

        // Standing sessions use the raw pose.
        let standing = session(TrackingOrigin::Standing);
        comp.end_frame(&standing, &[Some(&base)]).unwrap();
        assert_eq!(
            comp.runtime().submits[2].pose.translation(),
            Vector3::new(0.5, 0.0, -2.0)
        );
    }

    #[test]
    fn stale_chain_handle_fails_the_frame() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);
        let chain = comp.create_texture_swap_chain(&color_desc()).unwrap();
        comp.destroy_texture_swap_chain(chain).unwrap();

        let base = Layer::EyeFov(eye_layer(chain, None));
        assert_eq!(
            comp.end_frame(&session, &[Some(&base)]),
            Err(CompositorError::TextureSwapChainInvalid)
        );
    }

    #[test]
    fn unsupported_and_null_entries_are_skipped() {
        let mut comp = compositor(TextureApi::D3D11);
        let session = session(TrackingOrigin::Standing);

        let cylinder = Layer::Unsupported(UnsupportedKind::Cylinder);
        let cube = Layer::Unsupported(UnsupportedKind::Cube);
        assert_eq!(
            comp.end_frame(&session, &[None, Some(&cylinder), Some(&cube)]),
            Ok(FrameOutcome::Visible)
        );
        assert!(comp.runtime().submits.is_empty());
        assert!(comp.backend().blits.is_empty());
        assert_eq!(comp.backend().flushes, 1);
    }

    #[test]
    fn texture_creation_failure_issues_no_handle() {
        let mut comp = compositor(TextureApi::D3D11);
        comp.backend_mut().fail_creation = true;
        assert_eq!(
            comp.create_texture_swap_chain(&color_desc()),
            Err(CompositorError::Runtime)
        );

        comp.backend_mut().fail_creation = false;
        let id = comp.create_texture_swap_chain(&color_desc()).unwrap();
        assert!(comp.chain(id).is_some());
    }
}
