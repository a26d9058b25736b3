//! Dimension permutations for multidimensional arrays.
//!
//! This crate collects the permutation stack into one import:
//!
//! # Core Types
//!
//! - [`Perm`]: an explicit reordering of `0..N`, or the length-polymorphic
//!   [`Perm::NoPerm`] identity marker
//! - [`perm!`]: literal permutations validated during constant evaluation
//! - [`StridedArray`] / [`StridedView`] / [`StridedViewMut`]: owned and borrowed
//!   strided arrays
//! - [`PermutedView`] / [`PermutedViewMut`]: zero-copy views with reordered
//!   dimensions
//!
//! # Permutation Algebra
//!
//! - [`Perm::apply`]: reorder a sequence, `p.apply(xs)[i] == xs[p[i]]`
//! - [`Perm::compose`], [`Perm::invert`], [`Perm::relative`], [`relative_of`]
//! - [`Perm::append`], [`Perm::prepend`]: extend with fixed dimensions
//!
//! # Copies
//!
//! - [`permute_copy`]: `dest[I] = src[perm.invert().apply(I)]`, tiled in
//!   [`BLOCK_SIZE`] blocks
//! - [`copy_to_permuted`] / [`copy_from_permuted`]: copy through a permuted view
//! - [`permutedims`]: allocate and fill a permuted column-major array
//! - [`copy_into`]: straight strided copy
//!
//! # Example
//!
//! ```
//! use static_perm::{perm, permutedims, StridedArray};
//!
//! let p = perm![2, 0, 1];
//! let a = StridedArray::<f64>::from_fn_row_major(&[2, 3, 4], |idx| {
//!     (idx[0] * 100 + idx[1] * 10 + idx[2]) as f64
//! });
//!
//! let view = a.permuted(&p).unwrap();
//! assert_eq!(view.dims(), &[4, 2, 3]);
//!
//! let b = permutedims(&a.view(), &p).unwrap();
//! assert_eq!(b.get(&[3, 1, 2]), view.get(&[3, 1, 2]));
//! assert_eq!(b.get(&[3, 1, 2]), 123.0);
//! ```

pub use perm_core::{is_perm, perm, relative_of, Perm, PermError, Result};

pub use perm_view::{
    col_major_strides, for_each_index, reduce, reduce_into, row_major_strides, sum,
    PermutedView, PermutedViewMut, StridedArray, StridedView, StridedViewMut,
};

pub use perm_copy::{
    copy_from_permuted, copy_into, copy_to_permuted, copy_to_permuted_with_block_size,
    permute_copy, permute_copy_with_block_size, permutedims, BlockPlan, BLOCK_SIZE,
};
