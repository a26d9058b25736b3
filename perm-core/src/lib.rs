//! Permutations of array dimensions.
//!
//! A [`Perm`] is either an explicit reordering of `0..N` or the
//! length-polymorphic [`Perm::NoPerm`] marker, which stands for "identity of
//! whatever rank". Permutations are immutable values; the algebra
//! ([`Perm::compose`], [`Perm::invert`], [`Perm::relative`],
//! [`Perm::append`], [`Perm::prepend`]) always returns new values.
//!
//! Convention: output position `i` of `p.apply(xs)` holds `xs[p[i]]`, so
//! `p.get(i)` names the source dimension that lands in dimension `i`.
//!
//! Literal permutations can be checked while compiling:
//!
//! ```
//! use perm_core::{perm, Perm};
//!
//! let p = perm![1, 2, 0];
//! assert_eq!(p.apply(&[10, 20, 30]).unwrap(), vec![20, 30, 10]);
//! assert_eq!(p.invert().unwrap(), Perm::new([2, 0, 1]));
//! ```
//!
//! ```compile_fail
//! // `1` appears twice: rejected during constant evaluation.
//! let p = perm_core::perm![1, 1, 0];
//! ```

mod algebra;
mod error;
mod perm;

pub use algebra::relative_of;
pub use error::{PermError, Result};
pub use perm::{is_perm, Perm};

/// Build a [`Perm`] from a literal sequence, rejecting non-permutations at
/// compile time.
///
/// `perm![]` is the identity of length 0. Use [`Perm::NoPerm`] for the
/// length-polymorphic identity.
#[macro_export]
macro_rules! perm {
    () => {
        $crate::Perm::identity(0)
    };
    ($($p:expr),+ $(,)?) => {{
        const SEQ: &[usize] = &[$($p),+];
        const _: () = assert!($crate::is_perm(SEQ), "perm! literal is not a permutation");
        $crate::Perm::from_slice(SEQ)
    }};
}
