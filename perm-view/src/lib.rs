//! Strided arrays and zero-copy views with permuted dimensions.
//!
//! [`PermutedView`] reorders the dimensions of a borrowed [`StridedView`]
//! without touching the data: `dims` and `strides` are the parent's, permuted.
//! Element `I` of the view is element `iperm.apply(I)` of the parent.
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
//! use perm_view::{Perm, StridedArray};
//!
//! let a = StridedArray::<f64>::from_fn_col_major(&[2, 3], |idx| (idx[0] * 10 + idx[1]) as f64);
//! let t = a.permuted(Perm::new([1, 0])).unwrap();
//! assert_eq!(t.dims(), &[3, 2]);
//! assert_eq!(t.get(&[2, 1]), 12.0);
//! ```

pub mod auxiliary;
pub mod permuted;
pub mod reduce;
pub mod strided_view;

pub use auxiliary::{for_each_index, for_each_offset, is_both_contiguous, total_len};
pub use permuted::{PermutedView, PermutedViewMut};
pub use reduce::{reduce, reduce_into, sum};
pub use strided_view::{
    col_major_strides, row_major_strides, StridedArray, StridedView, StridedViewMut,
};

pub use perm_core::{Perm, PermError, Result};
