// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The wait/begin/end frame state machine.
//!
//! The guest SDK paces frames with a queue-ahead ("running start") contract:
//! a caller asking to begin frame N is blocked once for every frame it is
//! ahead of the session's recorded index — never more, never fewer. The host
//! runtime exposes a single blocking pose-wait primitive, so the pacer maps
//! the deficit onto repeated calls of it.
//!
//! The pacer tracks where the caller is in the frame cycle but does not
//! police it: calling `begin` without `wait` is the caller's choice, not an
//! error this core detects.

use crate::host::HostRuntime;
use crate::result::HostError;
use crate::session::Session;

/// Where the caller is in the frame cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PacerState {
    /// Between frames.
    #[default]
    Idle,
    /// Poses have been waited for; the frame has not begun.
    Waiting,
    /// Between `begin_frame` and `end_frame`.
    InFrame,
}

/// Drives the wait/begin/end frame cycle against the host's blocking
/// pose-wait primitive.
#[derive(Debug, Default)]
pub struct FramePacer {
    state: PacerState,
}

impl FramePacer {
    /// Creates a pacer in the [`Idle`](PacerState::Idle) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame-cycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> PacerState {
        self.state
    }

    /// Blocks until the session has caught up to `target_index`.
    ///
    /// Invokes the host's pose wait once per unit of deficit between the
    /// session's recorded frame index and `target_index`; a caller that is
    /// not behind is not blocked at all. The loop always runs to completion;
    /// the result of the **last** wait is returned, so a transient host
    /// error does not leave the pacing budget half-spent.
    pub fn wait_to_begin(
        &mut self,
        runtime: &mut dyn HostRuntime,
        session: &Session,
        target_index: u64,
    ) -> Result<(), HostError> {
        self.state = PacerState::Waiting;
        let mut result = Ok(());
        for _ in session.frame_index()..target_index {
            result = runtime.wait_for_poses();
        }
        result
    }

    /// Records `frame_index` on the session and enters the frame.
    ///
    /// Never blocks and never fails.
    pub fn begin(&mut self, session: &Session, frame_index: u64) {
        session.record_frame_index(frame_index);
        self.state = PacerState::InFrame;
    }

    /// Leaves the frame; called at the end of `end_frame`.
    pub fn finish(&mut self) {
        self.state = PacerState::Idle;
    }
}
