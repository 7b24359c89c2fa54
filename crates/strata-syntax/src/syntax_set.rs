//! Compact `const` bit set over [`SyntaxKind`].

use crate::SyntaxKind;

/// Every kind has one bit, so the whole enum must fit in a `u64`.
const _: () = assert!((SyntaxKind::ERROR as u16) < u64::BITS as u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SyntaxSet(u64);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    const fn bit(kind: SyntaxKind) -> u64 {
        1 << kind as u16
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < N {
            set = set.with(kinds[i]);
            i += 1;
        }
        set
    }

    #[must_use]
    pub const fn with(self, kind: SyntaxKind) -> Self {
        Self(self.0 | Self::bit(kind))
    }

    #[must_use]
    pub const fn union(self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}
