//! HostRef - pointer-sized reference into the host runtime's object space
//!
//! A `HostRef` is a raw token: it carries no ownership by itself. Whether a
//! given `HostRef` is a *new* reference (the receiver must release it) or a
//! *borrowed* one is part of the contract of the call that produced it, the
//! same way the host's C-level API documents it.
//!
//! # Encoding
//!
//! ```text
//! bits 0..32   slot index + 1   (never zero, so the token is NonZero)
//! bits 32..64  slot generation  (detects use of a recycled slot)
//! ```

use std::num::NonZeroU64;

/// Opaque reference to a host object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct HostRef(NonZeroU64);

const INDEX_MASK: u64 = 0x0000_0000_FFFF_FFFF;
const GENERATION_SHIFT: u64 = 32;

impl HostRef {
    /// Largest slot index that can be encoded
    pub const MAX_INDEX: u32 = u32::MAX - 1;

    /// Create from raw bits
    #[inline(always)]
    pub const fn from_bits(bits: NonZeroU64) -> Self {
        Self(bits)
    }

    /// Create from raw bits, returning `None` for the null token
    #[inline]
    pub fn from_raw(bits: u64) -> Option<Self> {
        NonZeroU64::new(bits).map(Self)
    }

    /// Get the raw bits
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0.get()
    }

    /// Pack a slot index and generation.
    ///
    /// # Panics
    /// Panics if `index` exceeds [`HostRef::MAX_INDEX`].
    #[inline]
    pub fn from_parts(index: u32, generation: u32) -> Self {
        assert!(index <= Self::MAX_INDEX, "host slot index out of range");
        let bits = ((generation as u64) << GENERATION_SHIFT) | (index as u64 + 1);
        // index + 1 >= 1, so the low half is never zero
        match NonZeroU64::new(bits) {
            Some(bits) => Self(bits),
            None => unreachable!(),
        }
    }

    /// Slot index
    #[inline]
    pub const fn index(self) -> u32 {
        ((self.0.get() & INDEX_MASK) - 1) as u32
    }

    /// Slot generation
    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0.get() >> GENERATION_SHIFT) as u32
    }
}

impl std::fmt::Debug for HostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HostRef(#{}@{})", self.index(), self.generation())
    }
}
