//! Cache-blocked permuting copy for strided arrays.
//!
//! [`permute_copy`] writes `dest[I] = src[perm.invert().apply(I)]`, i.e. it
//! materializes a permuted view of `src` into `dest`. The work is expressed as
//! a copy into a [`PermutedViewMut`](perm_view::PermutedViewMut) of `dest`
//! over `src`'s index space and tiled in `BLOCK_SIZE x BLOCK_SIZE` blocks
//! across the first moved axis pair (see [`block`]).
//!
//! # Dependency graph
//!
//! ```text
//! perm-core -> perm-view -> perm-copy
//! ```
//!
//! # Example
//!
//! ```
//! use perm_copy::permute_copy;
//! use perm_view::{Perm, StridedArray};
//!
//! let a = StridedArray::<f64>::from_fn_col_major(&[2, 3, 4], |idx| {
//!     (idx[0] * 100 + idx[1] * 10 + idx[2]) as f64
//! });
//! let mut b = StridedArray::<f64>::col_major(&[3, 4, 2]);
//! permute_copy(&mut b.view_mut(), &a.view(), &Perm::new([1, 2, 0])).unwrap();
//! assert_eq!(b.get(&[2, 3, 1]), 123.0);
//! ```

pub mod block;
pub mod copy;

pub use block::BlockPlan;
pub use copy::{
    copy_from_permuted, copy_into, copy_to_permuted, copy_to_permuted_with_block_size,
    permute_copy, permute_copy_with_block_size, permutedims,
};

/// Tile edge, in elements, for the two swapped axes of a blocked copy.
pub const BLOCK_SIZE: usize = 8;
