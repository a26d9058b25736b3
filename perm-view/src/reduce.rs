//! Reductions over strided views.

use std::ops::Add;

use num_traits::Zero;
use perm_core::{PermError, Result};

use crate::auxiliary::{for_each_offset, is_both_contiguous, total_len};
use crate::strided_view::{StridedView, StridedViewMut};

/// Full reduction with map function: `reduce(init, op, map.(src))`.
pub fn reduce<T: Copy, U: Clone, M, R>(
    src: &StridedView<T>,
    map_fn: M,
    reduce_fn: R,
    init: U,
) -> U
where
    M: Fn(T) -> U,
    R: Fn(U, U) -> U,
{
    let src_ptr = src.ptr();
    let dims = src.dims();
    let strides = src.strides();

    if is_both_contiguous(dims, strides, strides) {
        let slice = unsafe { std::slice::from_raw_parts(src_ptr, total_len(dims)) };
        return slice
            .iter()
            .fold(init, |acc, &val| reduce_fn(acc, map_fn(val)));
    }

    let mut acc = init;
    for_each_offset(dims, strides, strides, |off, _| {
        let val = unsafe { *src_ptr.offset(off) };
        acc = reduce_fn(acc.clone(), map_fn(val));
    });
    acc
}

/// Sum of all elements.
pub fn sum<T: Copy + Zero + Add<Output = T>>(src: &StridedView<T>) -> T {
    reduce(src, |x| x, |a, b| a + b, T::zero())
}

/// Reduce `src` into `dest`, accumulating on top of `dest`'s current values.
///
/// `dest` has the rank of `src`; each of its axes either matches `src` or has
/// extent 1, in which case that axis is reduced.
pub fn reduce_into<T: Copy, U: Clone, M, R>(
    dest: &mut StridedViewMut<U>,
    src: &StridedView<T>,
    map_fn: M,
    reduce_fn: R,
) -> Result<()>
where
    M: Fn(T) -> U,
    R: Fn(U, U) -> U,
{
    let src_dims = src.dims();
    if dest.ndim() != src.ndim() {
        return Err(PermError::DimensionMismatch {
            axis: None,
            expected: src.ndim(),
            found: dest.ndim(),
        });
    }
    if dest
        .dims()
        .iter()
        .zip(src_dims)
        .any(|(&d, &s)| d != s && d != 1)
    {
        return Err(PermError::ShapeMismatch(
            dest.dims().to_vec(),
            src_dims.to_vec(),
        ));
    }

    // Reduced axes revisit the same destination slot.
    let dest_strides: Vec<isize> = dest
        .dims()
        .iter()
        .zip(src_dims)
        .zip(dest.strides())
        .map(|((&d, &s), &st)| if d == s { st } else { 0 })
        .collect();

    let dest_ptr = dest.as_mut_ptr();
    let src_ptr = src.ptr();
    for_each_offset(src_dims, &dest_strides, src.strides(), |doff, soff| unsafe {
        let slot = &mut *dest_ptr.offset(doff);
        let val = *src_ptr.offset(soff);
        *slot = reduce_fn(slot.clone(), map_fn(val));
    });
    Ok(())
}
