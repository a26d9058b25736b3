//! Copy and permutation operations on strided views.

use perm_core::{Perm, PermError, Result};
use perm_view::auxiliary::{for_each_offset, is_both_contiguous, total_len};
use perm_view::{PermutedView, PermutedViewMut, StridedArray, StridedView, StridedViewMut};
use tracing::{instrument, trace};

use crate::block::{copy_blocked, BlockPlan};
use crate::BLOCK_SIZE;

fn check_same_shape(dest: &[usize], src: &[usize]) -> Result<()> {
    if dest.len() != src.len() {
        return Err(PermError::rank_mismatch(src.len(), dest.len()));
    }
    if let Some(axis) = (0..src.len()).find(|&k| dest[k] != src[k]) {
        return Err(PermError::DimensionMismatch {
            axis: Some(axis),
            expected: src[axis],
            found: dest[axis],
        });
    }
    Ok(())
}

/// Straight strided walk `dst[I] = src[I]`.
///
/// # Safety
/// Same contract as [`copy_blocked`].
unsafe fn copy_straight<T: Copy>(
    dst: *mut T,
    src: *const T,
    dims: &[usize],
    dst_strides: &[isize],
    src_strides: &[isize],
) {
    if is_both_contiguous(dims, dst_strides, src_strides) {
        std::ptr::copy_nonoverlapping(src, dst, total_len(dims));
        return;
    }
    for_each_offset(dims, dst_strides, src_strides, |d, s| unsafe {
        *dst.offset(d) = *src.offset(s);
    });
}

/// Copy elements from source to destination: `dest[I] = src[I]`.
///
/// Both must have the same dims. Identical dense layouts (both col-major or
/// both row-major) become a single memcpy.
#[instrument(level = "trace", skip_all)]
pub fn copy_into<T: Copy>(dest: &mut StridedViewMut<T>, src: &StridedView<T>) -> Result<()> {
    check_same_shape(dest.dims(), src.dims())?;
    if src.is_empty() {
        return Ok(());
    }
    let dst_ptr = dest.as_mut_ptr();
    unsafe { copy_straight(dst_ptr, src.ptr(), src.dims(), dest.strides(), src.strides()) };
    Ok(())
}

/// Copy `src` into a permuted destination view: `dest[I] = src[I]` for every
/// index `I` of the common index space.
///
/// Writes land in `dest`'s parent with its own strides, so the source is read
/// in order while the destination is scattered according to `dest.perm()`.
pub fn copy_to_permuted<T: Copy>(
    dest: &mut PermutedViewMut<T>,
    src: &StridedView<T>,
) -> Result<()> {
    copy_to_permuted_with_block_size(dest, src, BLOCK_SIZE)
}

/// [`copy_to_permuted`] with an explicit tile size (0 is treated as 1).
#[instrument(level = "trace", skip_all, fields(block_size = block_size))]
pub fn copy_to_permuted_with_block_size<T: Copy>(
    dest: &mut PermutedViewMut<T>,
    src: &StridedView<T>,
    block_size: usize,
) -> Result<()> {
    check_same_shape(dest.dims(), src.dims())?;
    if src.is_empty() {
        return Ok(());
    }

    let dst_ptr = dest.as_mut_ptr();
    let src_ptr = src.ptr();
    let dims = src.dims();
    let dst_strides = dest.strides();
    let src_strides = src.strides();
    let plan = BlockPlan::new(dest.perm(), dims.len());

    match plan {
        None => {
            trace!(?dims, "straight copy");
            unsafe { copy_straight(dst_ptr, src_ptr, dims, dst_strides, src_strides) };
        }
        Some(plan) => {
            trace!(?dims, ?plan, block_size, "blocked copy");
            unsafe {
                copy_blocked(
                    dst_ptr,
                    src_ptr,
                    dims,
                    dst_strides,
                    src_strides,
                    &plan,
                    block_size,
                )
            };
        }
    }
    Ok(())
}

/// Permuting copy: `dest[I] = src[perm.invert().apply(I)]`, so that
/// `dest.dims() == perm.apply(src.dims())`.
///
/// Output dimension `i` of `dest` is input dimension `perm.get(i)` of `src`.
/// All checks run before the first write; on error `dest` is untouched.
pub fn permute_copy<T: Copy>(
    dest: &mut StridedViewMut<T>,
    src: &StridedView<T>,
    perm: &Perm,
) -> Result<()> {
    permute_copy_with_block_size(dest, src, perm, BLOCK_SIZE)
}

/// [`permute_copy`] with an explicit tile size (0 is treated as 1).
pub fn permute_copy_with_block_size<T: Copy>(
    dest: &mut StridedViewMut<T>,
    src: &StridedView<T>,
    perm: &Perm,
    block_size: usize,
) -> Result<()> {
    let expected = perm.apply(src.dims())?;
    check_same_shape(dest.dims(), &expected)?;
    let mut target = PermutedViewMut::new(dest.reborrow(), perm.invert()?)?;
    copy_to_permuted_with_block_size(&mut target, src, block_size)
}

/// Materialize a permuted view into `dest`, which has the view's dims.
pub fn copy_from_permuted<T: Copy>(
    dest: &mut StridedViewMut<T>,
    src: &PermutedView<T>,
) -> Result<()> {
    check_same_shape(dest.dims(), src.dims())?;
    let mut target = PermutedViewMut::new(dest.reborrow(), src.iperm())?;
    copy_to_permuted(&mut target, src.parent())
}

/// Allocate a column-major array of shape `perm.apply(src.dims())` and fill it
/// with the permuted contents of `src`.
pub fn permutedims<T: Copy + Default>(
    src: &StridedView<T>,
    perm: &Perm,
) -> Result<StridedArray<T>> {
    let dims = perm.apply(src.dims())?;
    let mut out = StridedArray::col_major(&dims);
    permute_copy(&mut out.view_mut(), src, perm)?;
    Ok(out)
}
