// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture swap chains, their descriptors, and the chain store.
//!
//! A swap chain is a fixed-length ring of GPU textures: the application
//! renders into the slot at the submission cursor, and the cursor advances
//! by exactly one (mod length) each time the chain participates in a frame.
//! Chains are addressed through generational [`ChainId`] handles issued by
//! the [`ChainStore`], so stale handles are detected after destruction
//! rather than aliasing a recycled slot.
//!
//! The mirror surface shares this module: it is a single optional texture,
//! not a ring, used for on-screen preview of submitted frames.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use crate::backend::TextureResource;
use crate::host::OverlayHandle;

/// Ring length for newly created chains.
///
/// Backends whose API reports a bottom-left origin get single-buffer chains
/// instead; see [`Compositor::create_texture_swap_chain`].
///
/// [`Compositor::create_texture_swap_chain`]: crate::compositor::Compositor::create_texture_swap_chain
pub const DEFAULT_CHAIN_LENGTH: usize = 2;

/// What shape of texture a descriptor asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A 2-D texture (possibly an array).
    TwoD,
    /// A cube map. Accepted at creation; cube *layers* are not composited.
    Cube,
}

/// Pixel formats the guest SDK can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA, linear.
    Bgra8Unorm,
    /// 8-bit BGRA, sRGB.
    Bgra8UnormSrgb,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// Packed 11/11/10 float RGB.
    Rg11B10Float,
    /// 16-bit depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
    /// 32-bit float depth.
    Depth32Float,
}

/// How the texture may be bound by the application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindFlags {
    /// Bindable as a render target.
    pub render_target: bool,
    /// Bindable as a depth-stencil target.
    pub depth_stencil: bool,
    /// Bindable for unordered access.
    pub unordered_access: bool,
}

/// Additional texture properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MiscFlags {
    /// Mip generation may be requested on this texture.
    pub allow_generate_mips: bool,
    /// Mips regenerate automatically on write.
    pub auto_generate_mips: bool,
    /// Contents are DRM-protected.
    pub protected_content: bool,
}

/// Creation parameters for a swap chain's textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Texture shape.
    pub kind: TextureKind,
    /// Pixel format.
    pub format: TextureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Number of array slices.
    pub array_size: u32,
    /// MSAA sample count.
    pub sample_count: u32,
    /// Bind capabilities.
    pub bind_flags: BindFlags,
    /// Additional properties.
    pub misc_flags: MiscFlags,
}

impl TextureDesc {
    /// A plain 2-D color target of the given size, one mip, one slice.
    #[must_use]
    pub const fn color_2d(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            kind: TextureKind::TwoD,
            format,
            width,
            height,
            mip_levels: 1,
            array_size: 1,
            sample_count: 1,
            bind_flags: BindFlags {
                render_target: true,
                depth_stencil: false,
                unordered_access: false,
            },
            misc_flags: MiscFlags {
                allow_generate_mips: false,
                auto_generate_mips: false,
                protected_content: false,
            },
        }
    }
}

/// Creation parameters for the mirror surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MirrorDesc {
    /// Pixel format.
    pub format: TextureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Additional properties. Mip generation is always allowed on the
    /// created texture regardless of what is passed here.
    pub misc_flags: MiscFlags,
}

/// A handle to a swap chain in a [`ChainStore`].
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a chain is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ChainId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({}@gen{})", self.index, self.generation)
    }
}

/// A handle to the mirror surface slot.
///
/// Generation-stamped for the same stale-detection reason as [`ChainId`];
/// there is only ever one live mirror surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MirrorId {
    pub(crate) generation: u32,
}

impl fmt::Debug for MirrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MirrorId(gen{})", self.generation)
    }
}

/// A fixed-length ring of GPU textures plus its submission cursor.
pub struct TextureSwapChain {
    desc: TextureDesc,
    textures: Vec<Box<dyn TextureResource>>,
    /// Cursor in `[0, len)`. Atomic for `Sync`, relaxed everywhere: the
    /// caller contract permits at most one `end_frame` in flight and one
    /// producer per chain, so there is nothing to order against.
    submit_index: AtomicU32,
    serial: u64,
    /// Host overlay backing this chain's quad layers. Set at most once, on
    /// the first successful overlay creation, and kept for the chain's
    /// lifetime.
    overlay: OnceLock<OverlayHandle>,
}

impl TextureSwapChain {
    pub(crate) fn new(desc: TextureDesc, textures: Vec<Box<dyn TextureResource>>, serial: u64) -> Self {
        debug_assert!(!textures.is_empty(), "a chain needs at least one texture");
        Self {
            desc,
            textures,
            submit_index: AtomicU32::new(0),
            serial,
            overlay: OnceLock::new(),
        }
    }

    /// The descriptor the chain was created with.
    #[inline]
    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Ring length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Always false; chains are never empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Process-unique creation serial (diagnostics and tracing).
    #[inline]
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Current submission cursor.
    #[inline]
    #[must_use]
    pub fn submit_index(&self) -> u32 {
        self.submit_index.load(Ordering::Relaxed)
    }

    /// The texture at ring position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn texture(&self, index: usize) -> &dyn TextureResource {
        self.textures[index].as_ref()
    }

    /// The texture at the submission cursor.
    #[must_use]
    pub fn current_texture(&self) -> &dyn TextureResource {
        self.textures[self.submit_index() as usize].as_ref()
    }

    /// Advances the cursor by one position, wrapping at the ring length.
    ///
    /// Called exactly once per frame the chain participates in, whether it
    /// was sent to the host directly, blitted into the base layer, or shown
    /// through an overlay.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ring length fits in u32 by construction"
    )]
    pub(crate) fn submit(&self) {
        let next = (self.submit_index() + 1) % self.textures.len() as u32;
        self.submit_index.store(next, Ordering::Relaxed);
    }

    /// The cached overlay handle, if a quad layer ever used this chain.
    #[inline]
    #[must_use]
    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.overlay.get().copied()
    }

    /// Caches the overlay handle for the chain's lifetime. Later calls are
    /// ignored; the first handle wins.
    pub(crate) fn cache_overlay(&self, handle: OverlayHandle) {
        _ = self.overlay.set(handle);
    }
}

impl fmt::Debug for TextureSwapChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureSwapChain")
            .field("desc", &self.desc)
            .field("len", &self.textures.len())
            .field("submit_index", &self.submit_index())
            .field("serial", &self.serial)
            .field("overlay", &self.overlay.get())
            .finish_non_exhaustive()
    }
}

/// The mirror surface: a single texture refreshed from submitted frames.
pub struct MirrorSurface {
    desc: MirrorDesc,
    texture: Box<dyn TextureResource>,
}

impl MirrorSurface {
    pub(crate) fn new(desc: MirrorDesc, texture: Box<dyn TextureResource>) -> Self {
        Self { desc, texture }
    }

    /// The descriptor the surface was created with.
    #[inline]
    #[must_use]
    pub fn desc(&self) -> &MirrorDesc {
        &self.desc
    }

    /// The backing texture.
    #[must_use]
    pub fn texture(&self) -> &dyn TextureResource {
        self.texture.as_ref()
    }

    pub(crate) fn texture_mut(&mut self) -> &mut dyn TextureResource {
        self.texture.as_mut()
    }
}

impl fmt::Debug for MirrorSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorSurface")
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

struct Slot {
    generation: u32,
    chain: Option<TextureSwapChain>,
}

/// Arena of swap chains addressed by generational [`ChainId`] handles.
///
/// Destroyed slots are recycled via a free list; generation counters make
/// handles to destroyed chains resolve to `None` instead of a reused slot.
pub struct ChainStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_serial: u64,
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_serial: 0,
        }
    }

    /// Inserts a fully built chain and returns its handle.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count stays far below u32::MAX"
    )]
    pub(crate) fn insert(
        &mut self,
        desc: TextureDesc,
        textures: Vec<Box<dyn TextureResource>>,
    ) -> ChainId {
        let serial = self.next_serial;
        self.next_serial += 1;
        let chain = TextureSwapChain::new(desc, textures, serial);

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.chain = Some(chain);
            ChainId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                chain: Some(chain),
            });
            ChainId {
                index,
                generation: 0,
            }
        }
    }

    /// Resolves a handle, or `None` if it is stale or was never issued.
    #[must_use]
    pub fn get(&self, id: ChainId) -> Option<&TextureSwapChain> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.chain.as_ref()
    }

    /// Destroys a chain, freeing its slot for reuse.
    ///
    /// Any host overlay cached on the chain is **not** released: overlay
    /// handles live for the host session. A long-lived process that keeps
    /// creating quad-bearing chains therefore grows its overlay count; see
    /// the crate design notes.
    ///
    /// Returns `false` if the handle was stale.
    pub(crate) fn remove(&mut self, id: ChainId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation || slot.chain.is_none() {
            return false;
        }
        slot.chain = None;
        slot.generation += 1;
        self.free.push(id.index);
        true
    }
}

impl fmt::Debug for ChainStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStore")
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .field("next_serial", &self.next_serial)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HostTexture, TextureApi};
    use crate::transform::Matrix34;
    use core::any::Any;

    struct NullTexture;

    impl TextureResource for NullTexture {
        fn to_host_texture(&self) -> HostTexture {
            HostTexture {
                handle: 0,
                api: TextureApi::D3D11,
                pose: Matrix34::IDENTITY,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn textures(n: usize) -> Vec<Box<dyn TextureResource>> {
        (0..n).map(|_| Box::new(NullTexture) as Box<dyn TextureResource>).collect()
    }

    fn desc() -> TextureDesc {
        TextureDesc::color_2d(TextureFormat::Rgba8UnormSrgb, 128, 128)
    }

    #[test]
    fn cursor_is_submission_count_mod_length() {
        for len in 1..=4 {
            let chain = TextureSwapChain::new(desc(), textures(len), 0);
            for k in 0_u32..10 {
                assert_eq!(
                    chain.submit_index(),
                    k % len as u32,
                    "after {k} submissions of a {len}-ring"
                );
                chain.submit();
            }
        }
    }

    #[test]
    fn serials_increase_monotonically() {
        let mut store = ChainStore::new();
        let a = store.insert(desc(), textures(2));
        let b = store.insert(desc(), textures(2));
        assert!(store.get(a).unwrap().serial() < store.get(b).unwrap().serial());
    }

    #[test]
    fn stale_handle_resolves_to_none() {
        let mut store = ChainStore::new();
        let id = store.insert(desc(), textures(2));
        assert!(store.get(id).is_some());
        assert!(store.remove(id));
        assert!(store.get(id).is_none());
        assert!(!store.remove(id), "double destroy must fail");

        // The slot is recycled under a new generation; the old handle still
        // resolves to nothing.
        let new_id = store.insert(desc(), textures(2));
        assert_eq!(new_id.index(), id.index());
        assert_ne!(new_id.generation(), id.generation());
        assert!(store.get(id).is_none());
        assert!(store.get(new_id).is_some());
    }

    #[test]
    fn overlay_cache_keeps_first_handle() {
        let chain = TextureSwapChain::new(desc(), textures(2), 0);
        assert_eq!(chain.overlay(), None);
        chain.cache_overlay(OverlayHandle(7));
        chain.cache_overlay(OverlayHandle(9));
        assert_eq!(chain.overlay(), Some(OverlayHandle(7)));
    }
}
