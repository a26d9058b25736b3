//! Composition, inversion and other closed-form transforms on [`Perm`].

use crate::perm::{Perm, Seq};
use crate::{PermError, Result};

impl Perm {
    fn check_len(&self, found: usize) -> Result<()> {
        match self.len() {
            Some(expected) if expected != found => {
                Err(PermError::rank_mismatch(expected, found))
            }
            _ => Ok(()),
        }
    }

    /// Reorder `xs` so that output position `i` holds `xs[p[i]]`.
    ///
    /// The marker returns `xs` unchanged.
    pub fn apply<T: Clone>(&self, xs: &[T]) -> Result<Vec<T>> {
        self.check()?;
        self.check_len(xs.len())?;
        Ok((0..xs.len()).map(|i| xs[self.get(i)].clone()).collect())
    }

    /// [`apply`](Self::apply) for fixed-size tuples.
    pub fn apply_array<T: Copy, const N: usize>(&self, xs: [T; N]) -> Result<[T; N]> {
        self.check()?;
        self.check_len(N)?;
        Ok(std::array::from_fn(|i| xs[self.get(i)]))
    }

    /// [`apply`](Self::apply) into a caller-provided buffer of the same length.
    pub fn apply_into<T: Copy>(&self, xs: &[T], out: &mut [T]) -> Result<()> {
        self.check()?;
        self.check_len(xs.len())?;
        if out.len() != xs.len() {
            return Err(PermError::rank_mismatch(xs.len(), out.len()));
        }
        for (i, o) in out.iter_mut().enumerate() {
            *o = xs[self.get(i)];
        }
        Ok(())
    }

    /// The permutation `r` with `r.apply(x) == self.apply(q.apply(x))`,
    /// i.e. `r[i] = q[self[i]]`.
    ///
    /// The marker is a two-sided identity.
    pub fn compose(&self, q: &Perm) -> Result<Perm> {
        self.check()?;
        q.check()?;
        match (self, q) {
            (Perm::NoPerm, _) => Ok(q.clone()),
            (_, Perm::NoPerm) => Ok(self.clone()),
            (Perm::Explicit(p), Perm::Explicit(qs)) => {
                q.check_len(p.len())?;
                Ok(Perm::Explicit(p.iter().map(|&i| qs[i]).collect()))
            }
        }
    }

    /// The inverse `q` with `q[p[i]] = i`.
    pub fn invert(&self) -> Result<Perm> {
        self.check()?;
        match self {
            Perm::NoPerm => Ok(Perm::NoPerm),
            Perm::Explicit(p) => {
                let mut q: Seq = Seq::from_elem(0, p.len());
                for (i, &pi) in p.iter().enumerate() {
                    q[pi] = i;
                }
                Ok(Perm::Explicit(q))
            }
        }
    }

    /// The permutation that turns `x` into `y`: `relative(x, y).apply(x) == y`.
    ///
    /// Equal to `y.compose(&x.invert()?)` for valid inputs.
    pub fn relative(x: &Perm, y: &Perm) -> Result<Perm> {
        match (x, y) {
            (Perm::NoPerm, _) => {
                y.check()?;
                Ok(y.clone())
            }
            (_, Perm::NoPerm) => x.invert(),
            (Perm::Explicit(xs), Perm::Explicit(ys)) => {
                x.check()?;
                y.check()?;
                relative_of(xs, ys)
            }
        }
    }

    /// Extend with `m` trailing dimensions left in place.
    pub fn append(&self, m: usize) -> Perm {
        match self {
            Perm::NoPerm => Perm::NoPerm,
            Perm::Explicit(p) => {
                let n = p.len();
                Perm::Explicit(p.iter().copied().chain(n..n + m).collect())
            }
        }
    }

    /// Insert `m` leading dimensions left in place, shifting existing entries by `m`.
    pub fn prepend(&self, m: usize) -> Perm {
        match self {
            Perm::NoPerm => Perm::NoPerm,
            Perm::Explicit(p) => Perm::Explicit((0..m).chain(p.iter().map(|&i| i + m)).collect()),
        }
    }
}

/// The permutation `r` with `r.apply(x) == y` for arbitrary labels.
///
/// Each `r[i]` is the position of `y[i]` within `x`. Fails with
/// [`PermError::InvalidPermutation`] when `y` is not a rearrangement of `x`
/// (a label of `y` missing from `x`, or repeated labels).
pub fn relative_of<T: PartialEq>(x: &[T], y: &[T]) -> Result<Perm> {
    if x.len() != y.len() {
        return Err(PermError::rank_mismatch(x.len(), y.len()));
    }
    let n = x.len();
    let r = Perm::new(
        y.iter()
            .map(|yi| x.iter().position(|xi| xi == yi).unwrap_or(n)),
    );
    r.check()?;
    if !(0..n).all(|i| x[r.get(i)] == y[i]) {
        return Err(PermError::InvalidPermutation(r.iter().copied().collect()));
    }
    Ok(r)
}
