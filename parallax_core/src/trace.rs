// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods the
//! compositor calls at each frame-loop boundary. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed [`TraceSink`]. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

/// Emitted after `wait_to_begin_frame` finishes its wait loop.
#[derive(Clone, Copy, Debug)]
pub struct WaitEvent {
    /// The frame index the caller asked to begin.
    pub target_index: u64,
    /// How many blocking pose waits the deficit required.
    pub waits_issued: u64,
}

/// Emitted when a frame begins.
#[derive(Clone, Copy, Debug)]
pub struct BeginEvent {
    /// The frame index recorded on the session.
    pub frame_index: u64,
}

/// Emitted when the base eye layer is submitted to the host scene.
#[derive(Clone, Copy, Debug)]
pub struct SceneSubmitEvent {
    /// Creation serial of the left eye's chain.
    pub left_chain_serial: u64,
    /// Creation serial of the right eye's chain (equal to the left serial
    /// under the shared-texture shortcut).
    pub right_chain_serial: u64,
    /// The left chain's cursor at submission.
    pub left_submit_index: u32,
    /// The right chain's cursor at submission.
    pub right_submit_index: u32,
}

/// Emitted at the end of `end_frame`.
#[derive(Clone, Copy, Debug)]
pub struct EndFrameEvent {
    /// The session's frame index.
    pub frame_index: u64,
    /// Number of entries in the submitted layer list (including skipped
    /// ones).
    pub layer_count: usize,
    /// Overlays shown this frame.
    pub active_overlays: usize,
    /// Whether any eye layer reached the host scene.
    pub base_layer_found: bool,
}

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the pacing wait loop completes.
    fn on_frame_wait(&mut self, e: &WaitEvent) {
        _ = e;
    }

    /// Called when a frame begins.
    fn on_frame_begin(&mut self, e: &BeginEvent) {
        _ = e;
    }

    /// Called when the base layer is submitted to the host scene.
    fn on_scene_submit(&mut self, e: &SceneSubmitEvent) {
        _ = e;
    }

    /// Called at the end of `end_frame`.
    fn on_end_frame(&mut self, e: &EndFrameEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional owned [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`WaitEvent`].
    #[inline]
    pub fn frame_wait(&mut self, e: &WaitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_wait(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &BeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SceneSubmitEvent`].
    #[inline]
    pub fn scene_submit(&mut self, e: &SceneSubmitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scene_submit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EndFrameEvent`].
    #[inline]
    pub fn end_frame(&mut self, e: &EndFrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_end_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
