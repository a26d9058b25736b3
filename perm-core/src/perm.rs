//! The permutation value type.

use std::fmt;

use smallvec::SmallVec;

use crate::{PermError, Result};

/// Inline storage for permutation entries; ranks up to 8 never allocate.
pub(crate) type Seq = SmallVec<[usize; 8]>;

/// A reordering of array dimensions.
///
/// `Explicit` holds the sequence `p` with `p[i]` = the source position that
/// moves to position `i`. The sequence is not checked on construction; use
/// [`Perm::is_valid`] or [`Perm::check`].
///
/// `NoPerm` is the identity of unconstrained length. It compares equal to
/// every identity permutation regardless of length, which is why `Perm` is
/// `PartialEq` but not `Eq`.
#[derive(Clone, Debug, Default)]
pub enum Perm {
    #[default]
    NoPerm,
    Explicit(Seq),
}

/// Check whether `p` is a bijection on `0..p.len()`.
///
/// Usable in constant context; the [`perm!`](crate::perm) macro relies on it
/// to reject bad literals at compile time.
pub const fn is_perm(p: &[usize]) -> bool {
    let n = p.len();
    let mut i = 0;
    while i < n {
        if p[i] >= n {
            return false;
        }
        let mut j = i + 1;
        while j < n {
            if p[i] == p[j] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

impl Perm {
    /// Create an explicit permutation from a sequence of dimension indices.
    pub fn new<I: IntoIterator<Item = usize>>(seq: I) -> Self {
        Perm::Explicit(seq.into_iter().collect())
    }

    pub fn from_slice(seq: &[usize]) -> Self {
        Perm::Explicit(Seq::from_slice(seq))
    }

    /// The canonical identity `(0, 1, ..., n - 1)`.
    pub fn identity(n: usize) -> Self {
        Perm::Explicit((0..n).collect())
    }

    /// Number of entries, or `None` for the marker.
    #[inline]
    pub fn len(&self) -> Option<usize> {
        match self {
            Perm::NoPerm => None,
            Perm::Explicit(seq) => Some(seq.len()),
        }
    }

    /// True only for the explicit permutation of length 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    #[inline]
    pub fn as_slice(&self) -> Option<&[usize]> {
        match self {
            Perm::NoPerm => None,
            Perm::Explicit(seq) => Some(seq),
        }
    }

    #[inline]
    pub fn is_no_perm(&self) -> bool {
        matches!(self, Perm::NoPerm)
    }

    /// Iterate over the entries (nothing for the marker).
    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.as_slice().unwrap_or(&[]).iter()
    }

    /// Entry at position `i`. The marker maps every `i` to itself.
    ///
    /// # Panics
    /// Panics if `i` is out of range for an explicit permutation.
    #[inline]
    pub fn get(&self, i: usize) -> usize {
        match self {
            Perm::NoPerm => i,
            Perm::Explicit(seq) => seq[i],
        }
    }

    /// Position holding the value `v`, if any.
    pub fn position(&self, v: usize) -> Option<usize> {
        match self {
            Perm::NoPerm => Some(v),
            Perm::Explicit(seq) => seq.iter().position(|&x| x == v),
        }
    }

    /// Whether the entries form a bijection on `0..len`. Always true for the marker.
    pub fn is_valid(&self) -> bool {
        match self {
            Perm::NoPerm => true,
            Perm::Explicit(seq) => {
                let n = seq.len();
                let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, n);
                for &p in seq.iter() {
                    if p >= n || seen[p] {
                        return false;
                    }
                    seen[p] = true;
                }
                true
            }
        }
    }

    /// Fail with [`PermError::InvalidPermutation`] unless [`is_valid`](Self::is_valid).
    pub fn check(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(PermError::InvalidPermutation(self.iter().copied().collect()))
        }
    }

    /// Whether applying the permutation leaves every sequence unchanged.
    pub fn is_identity(&self) -> bool {
        match self {
            Perm::NoPerm => true,
            Perm::Explicit(seq) => seq.iter().enumerate().all(|(i, &p)| i == p),
        }
    }

    /// Number of leading positions with `p[i] == i`, capped at `rank`.
    ///
    /// The marker leaves every dimension in place and returns `rank`.
    pub fn fixed_prefix_len(&self, rank: usize) -> usize {
        match self {
            Perm::NoPerm => rank,
            Perm::Explicit(seq) => seq
                .iter()
                .take(rank)
                .enumerate()
                .take_while(|&(i, &p)| i == p)
                .count(),
        }
    }
}

impl PartialEq for Perm {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Perm::NoPerm, Perm::NoPerm) => true,
            (Perm::NoPerm, p) | (p, Perm::NoPerm) => p.is_identity(),
            (Perm::Explicit(a), Perm::Explicit(b)) => a == b,
        }
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perm::NoPerm => f.write_str("NoPerm"),
            Perm::Explicit(seq) => {
                f.write_str("Perm(")?;
                for (i, p) in seq.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl<const N: usize> From<[usize; N]> for Perm {
    fn from(seq: [usize; N]) -> Self {
        Perm::from_slice(&seq)
    }
}

impl From<&[usize]> for Perm {
    fn from(seq: &[usize]) -> Self {
        Perm::from_slice(seq)
    }
}

impl From<&Perm> for Perm {
    fn from(perm: &Perm) -> Self {
        perm.clone()
    }
}

impl From<Vec<usize>> for Perm {
    fn from(seq: Vec<usize>) -> Self {
        Perm::Explicit(Seq::from_vec(seq))
    }
}
