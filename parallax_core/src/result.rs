// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unified result codes and the host-error translation table.
//!
//! Host runtime operations report a [`HostError`] drawn from the host's own
//! result enumeration. The caller-facing API speaks only the unified
//! vocabulary: `Ok(`[`FrameOutcome`]`)` for success (including the soft
//! "completed but not visible" variants) and [`CompositorError`] for hard
//! failures. [`translate`] is the single, total, pure mapping between the
//! two; no host enumerator reaches the caller untranslated.

use thiserror::Error;

/// A result code reported by the host compositor runtime.
///
/// `Other` carries any enumerator this shim does not recognize, so newer
/// host runtimes cannot produce an unmappable value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostError {
    /// The host service and client library disagree on interface version.
    IncompatibleVersion,
    /// Another application holds rendering focus; the frame was accepted but
    /// is not being displayed.
    DoNotHaveFocus,
    /// The submitted texture handle was rejected.
    InvalidTexture,
    /// The session is not registered as a scene application.
    IsNotSceneApplication,
    /// The texture lives on a different GPU than the host compositor.
    TextureIsOnWrongDevice,
    /// The texture's pixel format is not supported by the host.
    TextureUsesUnsupportedFormat,
    /// The host cannot open shared texture handles at all.
    SharedTexturesNotSupported,
    /// An index argument was out of range.
    IndexOutOfRange,
    /// This frame was already submitted; the duplicate was dropped.
    AlreadySubmitted,
    /// The texture bounds were rejected.
    InvalidBounds,
    /// Any enumerator not otherwise recognized, by raw value.
    Other(u32),
}

/// A hard failure reported to the caller.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum CompositorError {
    /// A caller-supplied parameter was rejected before any work was done.
    #[error("invalid parameter")]
    InvalidParameter,
    /// A texture swap chain handle or its contents were rejected.
    #[error("texture swap chain is invalid")]
    TextureSwapChainInvalid,
    /// The session is not in a state that may submit frames.
    #[error("invalid session")]
    InvalidSession,
    /// The host runtime service itself failed.
    #[error("host service error")]
    Service,
    /// An unclassified host runtime failure.
    #[error("host runtime failure")]
    Runtime,
}

/// How a successful call left the output.
///
/// Soft successes are successes for control-flow purposes; the distinction
/// only tells the caller whether its output is currently reaching the
/// display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameOutcome {
    /// The frame is being displayed.
    Visible,
    /// The call completed, but output is not currently visible to the user.
    NotVisible,
}

/// The unified result type of every caller-facing frame operation.
pub type FrameResult = Result<FrameOutcome, CompositorError>;

/// Translates a host operation result into the unified vocabulary.
///
/// Total and pure: every [`HostError`] enumerator maps to exactly one
/// unified code.
#[must_use]
pub fn translate(result: Result<(), HostError>) -> FrameResult {
    let Err(error) = result else {
        return Ok(FrameOutcome::Visible);
    };
    match error {
        HostError::DoNotHaveFocus | HostError::AlreadySubmitted => Ok(FrameOutcome::NotVisible),
        HostError::InvalidTexture
        | HostError::TextureIsOnWrongDevice
        | HostError::TextureUsesUnsupportedFormat
        | HostError::SharedTexturesNotSupported => Err(CompositorError::TextureSwapChainInvalid),
        HostError::IsNotSceneApplication => Err(CompositorError::InvalidSession),
        HostError::IndexOutOfRange | HostError::InvalidBounds => {
            Err(CompositorError::InvalidParameter)
        }
        HostError::IncompatibleVersion => Err(CompositorError::Service),
        HostError::Other(_) => Err(CompositorError::Runtime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_translates_to_visible() {
        assert_eq!(translate(Ok(())), Ok(FrameOutcome::Visible));
    }

    #[test]
    fn mapping_is_total() {
        // One entry per enumerator; a new variant fails the length check
        // until it is added here with its expected unified code.
        let table: [(HostError, FrameResult); 11] = [
            (
                HostError::IncompatibleVersion,
                Err(CompositorError::Service),
            ),
            (HostError::DoNotHaveFocus, Ok(FrameOutcome::NotVisible)),
            (
                HostError::InvalidTexture,
                Err(CompositorError::TextureSwapChainInvalid),
            ),
            (
                HostError::IsNotSceneApplication,
                Err(CompositorError::InvalidSession),
            ),
            (
                HostError::TextureIsOnWrongDevice,
                Err(CompositorError::TextureSwapChainInvalid),
            ),
            (
                HostError::TextureUsesUnsupportedFormat,
                Err(CompositorError::TextureSwapChainInvalid),
            ),
            (
                HostError::SharedTexturesNotSupported,
                Err(CompositorError::TextureSwapChainInvalid),
            ),
            (
                HostError::IndexOutOfRange,
                Err(CompositorError::InvalidParameter),
            ),
            (HostError::AlreadySubmitted, Ok(FrameOutcome::NotVisible)),
            (
                HostError::InvalidBounds,
                Err(CompositorError::InvalidParameter),
            ),
            (HostError::Other(940), Err(CompositorError::Runtime)),
        ];
        for (error, expected) in table {
            assert_eq!(translate(Err(error)), expected, "{error:?}");
        }
    }

    #[test]
    fn soft_successes_are_ok_for_control_flow() {
        assert!(translate(Err(HostError::DoNotHaveFocus)).is_ok());
        assert!(translate(Err(HostError::AlreadySubmitted)).is_ok());
        assert!(translate(Err(HostError::InvalidBounds)).is_err());
    }
}
