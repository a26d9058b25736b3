//! Tiled traversal for permuting copies.
//!
//! Axes are split into four groups relative to the destination view's
//! permutation `q` over the common index space:
//!
//! ```text
//! inner  = 0..d          q fixes these axes; walked innermost
//! is     = d             first moved axis (tiled, inner tile loop)
//! middle = d+1..ip
//! ip     = q.position(d) axis landing on destination position d (tiled, outer tile loop)
//! outer  = ip+1..rank
//! ```
//!
//! The swapped pair is visited in `block x block` tiles so that both the
//! source and destination touch a small working set per tile.

use std::ops::Range;

use perm_core::Perm;
use perm_view::auxiliary::{for_each_offset, is_both_contiguous, total_len};

/// Axis split for the blocked traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    /// Length of the fixed prefix (`d`).
    pub fixed: usize,
    /// The tiled pair `(is, ip)` with `is == fixed < ip`.
    pub swapped: (usize, usize),
}

impl BlockPlan {
    /// Plan the traversal for `perm` over `rank` axes.
    ///
    /// Returns `None` when `perm` fixes every axis and a straight copy suffices.
    /// `perm` must be valid.
    pub fn new(perm: &Perm, rank: usize) -> Option<Self> {
        let fixed = perm.fixed_prefix_len(rank);
        if fixed >= rank {
            return None;
        }
        let ip = perm.position(fixed)?;
        debug_assert!(ip > fixed);
        Some(Self {
            fixed,
            swapped: (fixed, ip),
        })
    }

    #[inline]
    pub fn inner(&self) -> Range<usize> {
        0..self.fixed
    }

    #[inline]
    pub fn middle(&self) -> Range<usize> {
        self.fixed + 1..self.swapped.1
    }

    #[inline]
    pub fn outer(&self, rank: usize) -> Range<usize> {
        self.swapped.1 + 1..rank
    }
}

/// How one visit of the inner axes moves data.
enum InnerCopy {
    /// A single element.
    Element,
    /// `len` elements, unit stride in both arrays.
    Contiguous(usize),
    /// General strided walk.
    Strided,
}

/// Copy `src` to `dst` over `dims`, element `I` at `dst_strides . I` and
/// `src_strides . I`, following `plan` with tiles of `block` (at least 1).
///
/// # Safety
/// Every offset reachable from `dims` and the strides must be in bounds for
/// its pointer, and the two regions must not overlap.
pub(crate) unsafe fn copy_blocked<T: Copy>(
    dst: *mut T,
    src: *const T,
    dims: &[usize],
    dst_strides: &[isize],
    src_strides: &[isize],
    plan: &BlockPlan,
    block: usize,
) {
    let rank = dims.len();
    let block = block.max(1);
    let (is, ip) = plan.swapped;

    let r1 = plan.inner();
    let r2 = plan.middle();
    let r3 = plan.outer(rank);

    let inner_dims = &dims[r1.clone()];
    let inner_dst = &dst_strides[r1.clone()];
    let inner_src = &src_strides[r1];
    let inner = match total_len(inner_dims) {
        1 => InnerCopy::Element,
        n if is_both_contiguous(inner_dims, inner_dst, inner_src) => InnerCopy::Contiguous(n),
        _ => InnerCopy::Strided,
    };

    let (ni, nj) = (dims[is], dims[ip]);
    let (dsi, ssi) = (dst_strides[is], src_strides[is]);
    let (dsj, ssj) = (dst_strides[ip], src_strides[ip]);

    let visit = |doff: isize, soff: isize| match inner {
        InnerCopy::Element => unsafe { *dst.offset(doff) = *src.offset(soff) },
        InnerCopy::Contiguous(n) => unsafe {
            std::ptr::copy_nonoverlapping(src.offset(soff), dst.offset(doff), n)
        },
        InnerCopy::Strided => for_each_offset(inner_dims, inner_dst, inner_src, |a, b| unsafe {
            *dst.offset(doff + a) = *src.offset(soff + b)
        }),
    };

    let (middle_dims, middle_dst, middle_src) =
        (&dims[r2.clone()], &dst_strides[r2.clone()], &src_strides[r2]);
    let (outer_dims, outer_dst, outer_src) =
        (&dims[r3.clone()], &dst_strides[r3.clone()], &src_strides[r3]);

    for jo in (0..nj).step_by(block) {
        let j_end = (jo + block).min(nj);
        for io in (0..ni).step_by(block) {
            let i_end = (io + block).min(ni);
            for_each_offset(outer_dims, outer_dst, outer_src, |d3, s3| {
                for_each_offset(middle_dims, middle_dst, middle_src, |d2, s2| {
                    for j in jo..j_end {
                        let dj = d3 + d2 + j as isize * dsj;
                        let sj = s3 + s2 + j as isize * ssj;
                        for i in io..i_end {
                            visit(dj + i as isize * dsi, sj + i as isize * ssi);
                        }
                    }
                });
            });
        }
    }
}
