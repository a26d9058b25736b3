//! Zero-copy views with permuted dimensions.
//!
//! A permuted view borrows its parent and reports
//! `dims = perm.apply(parent.dims)`, `strides = perm.apply(parent.strides)`.
//! Element `I` of the view is element `iperm.apply(I)` of the parent.

use std::ops::Add;

use num_traits::Zero;
use perm_core::{Perm, PermError, Result};
use smallvec::SmallVec;

use crate::reduce::{reduce, reduce_into, sum};
use crate::strided_view::{col_major_strides, StridedArray, StridedView, StridedViewMut};

/// Validated permutation, its inverse and the permuted layout of `dims`/`strides`.
struct Layout {
    perm: Perm,
    iperm: Perm,
    dims: Vec<usize>,
    strides: Vec<isize>,
}

impl Layout {
    fn new(perm: Perm, dims: &[usize], strides: &[isize]) -> Result<Self> {
        perm.check()?;
        if let Some(n) = perm.len() {
            if n != dims.len() {
                return Err(PermError::DimensionMismatch {
                    axis: None,
                    expected: dims.len(),
                    found: n,
                });
            }
        }
        Ok(Self {
            dims: perm.apply(dims)?,
            strides: perm.apply(strides)?,
            iperm: perm.invert()?,
            perm,
        })
    }

    /// Parent multi-index for view index `indices`.
    #[inline]
    fn parent_index(&self, indices: &[usize]) -> SmallVec<[usize; 8]> {
        assert_eq!(indices.len(), self.dims.len(), "wrong number of indices");
        (0..indices.len())
            .map(|k| indices[self.iperm.get(k)])
            .collect()
    }
}

const LINEAR_INDEXING: &str = "linear indexing of a permuted view";

// ============================================================================
// PermutedView
// ============================================================================

/// Read-only view of a [`StridedView`] with permuted dimensions.
pub struct PermutedView<'a, T> {
    parent: StridedView<'a, T>,
    layout: Layout,
}

impl<T> std::fmt::Debug for PermutedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutedView")
            .field("perm", &self.layout.perm)
            .field("dims", &self.layout.dims)
            .field("strides", &self.layout.strides)
            .finish()
    }
}

impl<T> Clone for PermutedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            layout: Layout {
                perm: self.layout.perm.clone(),
                iperm: self.layout.iperm.clone(),
                dims: self.layout.dims.clone(),
                strides: self.layout.strides.clone(),
            },
        }
    }
}

impl<'a, T> PermutedView<'a, T> {
    /// Wrap `parent` so that view dimension `i` is parent dimension `perm.get(i)`.
    ///
    /// [`Perm::NoPerm`] is accepted for any rank.
    pub fn new(parent: StridedView<'a, T>, perm: impl Into<Perm>) -> Result<Self> {
        let layout = Layout::new(perm.into(), parent.dims(), parent.strides())?;
        Ok(Self { parent, layout })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.layout.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.layout.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    pub fn perm(&self) -> &Perm {
        &self.layout.perm
    }

    #[inline]
    pub fn iperm(&self) -> &Perm {
        &self.layout.iperm
    }

    #[inline]
    pub fn parent(&self) -> &StridedView<'a, T> {
        &self.parent
    }

    pub fn into_parent(self) -> StridedView<'a, T> {
        self.parent
    }

    /// Base address of the parent, for interop with raw-pointer consumers.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.parent.ptr()
    }

    /// The same elements as a plain strided view in permuted order (zero-copy).
    pub fn as_strided(&self) -> StridedView<'a, T> {
        self.parent
            .relayout(&self.layout.dims, &self.layout.strides)
    }

    /// Permute again. Nested permutations collapse into one view over the
    /// same parent with permutation `q.compose(perm)`.
    pub fn permute(self, q: &Perm) -> Result<PermutedView<'a, T>> {
        let perm = q.compose(&self.layout.perm)?;
        PermutedView::new(self.parent, perm)
    }
}

impl<T: Copy> PermutedView<'_, T> {
    /// Get an element, reading `parent[iperm.apply(indices)]`.
    pub fn get(&self, indices: &[usize]) -> T {
        self.parent.get(&self.layout.parent_index(indices))
    }

    /// Linear offsets are ambiguous once dimensions are reordered.
    pub fn get_linear(&self, _offset: usize) -> Result<T> {
        Err(PermError::UnsupportedOperation(LINEAR_INDEXING))
    }

    /// Full reduction; dimension order does not matter, so the parent is reduced directly.
    pub fn reduce<U: Clone, M, R>(&self, map_fn: M, reduce_fn: R, init: U) -> U
    where
        M: Fn(T) -> U,
        R: Fn(U, U) -> U,
    {
        reduce(&self.parent, map_fn, reduce_fn, init)
    }

    /// Reduce into `dest`, laid out in this view's dimension order.
    ///
    /// `dest` is wrapped with the inverse permutation so the parent can be
    /// reduced in its own order while results land in `dest`'s order.
    pub fn reduce_into<U: Clone, M, R>(
        &self,
        dest: &mut StridedViewMut<'_, U>,
        map_fn: M,
        reduce_fn: R,
    ) -> Result<()>
    where
        M: Fn(T) -> U,
        R: Fn(U, U) -> U,
    {
        if dest.ndim() != self.ndim() {
            return Err(PermError::DimensionMismatch {
                axis: None,
                expected: self.ndim(),
                found: dest.ndim(),
            });
        }
        let mut target = PermutedViewMut::new(dest.reborrow(), &self.layout.iperm)?;
        reduce_into(&mut target.as_strided_mut(), &self.parent, map_fn, reduce_fn)
    }
}

impl<T: Copy + Zero + Add<Output = T>> PermutedView<'_, T> {
    pub fn sum(&self) -> T {
        sum(&self.parent)
    }

    /// Sum over `axes` (view numbering). Reduced axes keep extent 1 in the
    /// column-major result.
    pub fn sum_axes(&self, axes: &[usize]) -> Result<StridedArray<T>> {
        let rank = self.ndim();
        let mut out_dims = self.dims().to_vec();
        for &axis in axes {
            if axis >= rank {
                return Err(PermError::InvalidAxis { axis, rank });
            }
            out_dims[axis] = 1;
        }
        let total: usize = out_dims.iter().product();
        let strides = col_major_strides(&out_dims);
        let mut out = StridedArray::from_parts(vec![T::zero(); total], &out_dims, &strides, 0)?;
        self.reduce_into(&mut out.view_mut(), |x| x, |a, b| a + b)?;
        Ok(out)
    }
}

// ============================================================================
// PermutedViewMut
// ============================================================================

/// Mutable view of a [`StridedViewMut`] with permuted dimensions.
///
/// Writes go straight to the parent's buffer.
pub struct PermutedViewMut<'a, T> {
    parent: StridedViewMut<'a, T>,
    layout: Layout,
}

impl<T> std::fmt::Debug for PermutedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutedViewMut")
            .field("perm", &self.layout.perm)
            .field("dims", &self.layout.dims)
            .field("strides", &self.layout.strides)
            .finish()
    }
}

impl<'a, T> PermutedViewMut<'a, T> {
    /// Mutable counterpart of [`PermutedView::new`].
    pub fn new(parent: StridedViewMut<'a, T>, perm: impl Into<Perm>) -> Result<Self> {
        let layout = Layout::new(perm.into(), parent.dims(), parent.strides())?;
        Ok(Self { parent, layout })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.layout.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.layout.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    pub fn perm(&self) -> &Perm {
        &self.layout.perm
    }

    #[inline]
    pub fn iperm(&self) -> &Perm {
        &self.layout.iperm
    }

    #[inline]
    pub fn parent(&self) -> &StridedViewMut<'a, T> {
        &self.parent
    }

    pub fn into_parent(self) -> StridedViewMut<'a, T> {
        self.parent
    }

    #[inline]
    pub fn ptr(&self) -> *const T {
        self.parent.ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.parent.as_mut_ptr()
    }

    /// Read-only view with the same permutation.
    pub fn as_view(&self) -> PermutedView<'_, T> {
        PermutedView {
            parent: self.parent.as_view(),
            layout: Layout {
                perm: self.layout.perm.clone(),
                iperm: self.layout.iperm.clone(),
                dims: self.layout.dims.clone(),
                strides: self.layout.strides.clone(),
            },
        }
    }

    /// The same elements as a mutable strided view in permuted order (zero-copy).
    pub fn as_strided_mut(&mut self) -> StridedViewMut<'_, T> {
        self.parent
            .reborrow()
            .relayout(&self.layout.dims, &self.layout.strides)
    }

    /// Consuming counterpart of [`PermutedView::permute`].
    pub fn permute(self, q: &Perm) -> Result<PermutedViewMut<'a, T>> {
        let perm = q.compose(&self.layout.perm)?;
        PermutedViewMut::new(self.parent, perm)
    }
}

impl<T: Copy> PermutedViewMut<'_, T> {
    pub fn get(&self, indices: &[usize]) -> T {
        self.parent.get(&self.layout.parent_index(indices))
    }

    /// Set an element, writing `parent[iperm.apply(indices)]`.
    pub fn set(&mut self, indices: &[usize], value: T) {
        let idx = self.layout.parent_index(indices);
        self.parent.set(&idx, value);
    }

    pub fn get_linear(&self, _offset: usize) -> Result<T> {
        Err(PermError::UnsupportedOperation(LINEAR_INDEXING))
    }

    pub fn set_linear(&mut self, _offset: usize, _value: T) -> Result<()> {
        Err(PermError::UnsupportedOperation(LINEAR_INDEXING))
    }
}

impl<T> StridedArray<T> {
    /// Permuted view over this array.
    pub fn permuted(&self, perm: impl Into<Perm>) -> Result<PermutedView<'_, T>> {
        PermutedView::new(self.view(), perm)
    }

    /// Mutable permuted view over this array.
    pub fn permuted_mut(&mut self, perm: impl Into<Perm>) -> Result<PermutedViewMut<'_, T>> {
        PermutedViewMut::new(self.view_mut(), perm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn make_3d() -> StridedArray<f64> {
        StridedArray::from_fn_col_major(&[2, 3, 4], |idx| {
            (idx[0] * 100 + idx[1] * 10 + idx[2]) as f64
        })
    }

    #[test]
    fn test_dims_and_strides() {
        let a = make_3d();
        let v = a.permuted([1, 2, 0]).unwrap();
        assert_eq!(v.dims(), &[3, 4, 2]);
        assert_eq!(v.strides(), &[2, 6, 1]);
        assert_eq!(v.iperm(), &Perm::new([2, 0, 1]));
        assert_eq!(v.len(), 24);
    }

    #[test]
    fn test_get_through_inverse() {
        let a = make_3d();
        let v = a.permuted([1, 2, 0]).unwrap();
        // view[j, k, i] == a[i, j, k]
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(v.get(&[j, k, i]), a.get(&[i, j, k]));
                }
            }
        }
        assert_eq!(v.as_strided().get(&[2, 3, 1]), a.get(&[1, 2, 3]));
    }

    #[test]
    fn test_rank_mismatch() {
        let a = make_3d();
        assert!(matches!(
            a.permuted([1, 0]),
            Err(PermError::DimensionMismatch {
                axis: None,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            a.permuted([0, 0, 1]),
            Err(PermError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_no_perm_any_rank() {
        let a = make_3d();
        let v = a.permuted(Perm::NoPerm).unwrap();
        assert_eq!(v.dims(), a.dims());
        assert_eq!(v.get(&[1, 2, 3]), 123.0);
        let flat = StridedArray::from_fn_col_major(&[5], |idx| idx[0] as f64);
        assert_eq!(flat.permuted(Perm::NoPerm).unwrap().get(&[4]), 4.0);
    }

    #[test]
    fn test_round_trip_permute() {
        let a = make_3d();
        let p = Perm::new([2, 0, 1]);
        let v = a.permuted(&p).unwrap();
        let back = v.permute(&p.invert().unwrap()).unwrap();
        assert!(back.perm().is_identity());
        assert_eq!(back.dims(), a.dims());
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(back.get(&[i, j, k]), a.get(&[i, j, k]));
                }
            }
        }
    }

    #[test]
    fn test_nested_permute_composes() {
        let a = make_3d();
        let p = Perm::new([1, 2, 0]);
        let q = Perm::new([1, 0, 2]);
        let nested = a.permuted(&p).unwrap().permute(&q).unwrap();
        assert_eq!(nested.dims(), q.apply(&p.apply(a.dims()).unwrap()).unwrap());
        assert_eq!(nested.perm(), &q.compose(&p).unwrap());
    }

    #[test]
    fn test_linear_indexing_unsupported() {
        let mut a = make_3d();
        assert!(matches!(
            a.permuted([1, 0, 2]).unwrap().get_linear(0),
            Err(PermError::UnsupportedOperation(_))
        ));
        let mut vm = a.permuted_mut([1, 0, 2]).unwrap();
        assert!(vm.set_linear(0, 1.0).is_err());
        assert!(vm.get_linear(0).is_err());
    }

    #[test]
    fn test_set_writes_parent() {
        let mut a = StridedArray::<i32>::col_major(&[2, 3]);
        {
            let mut vm = a.permuted_mut([1, 0]).unwrap();
            assert_eq!(vm.dims(), &[3, 2]);
            vm.set(&[2, 1], 7);
            vm.set(&[0, 1], 5);
            assert_eq!(vm.get(&[2, 1]), 7);
            assert_eq!(vm.as_view().get(&[0, 1]), 5);
        }
        assert_eq!(a.get(&[1, 2]), 7);
        assert_eq!(a.get(&[1, 0]), 5);
    }

    #[test]
    fn test_ptr_is_parent_base() {
        let a = make_3d();
        let v = a.permuted([2, 1, 0]).unwrap();
        assert_eq!(v.ptr(), a.data().as_ptr());
    }

    #[test]
    fn test_sum_delegates() {
        let a = make_3d();
        let v = a.permuted([2, 0, 1]).unwrap();
        assert_relative_eq!(v.sum(), sum(&a.view()));
        let count = v.reduce(|_| 1usize, |x, y| x + y, 0);
        assert_eq!(count, 24);
    }

    #[test]
    fn test_sum_axes_in_view_order() {
        let a = make_3d();
        let v = a.permuted([2, 0, 1]).unwrap(); // dims [4, 2, 3]
        let s = v.sum_axes(&[1]).unwrap();
        assert_eq!(s.dims(), &[4, 1, 3]);
        for k in 0..4 {
            for j in 0..3 {
                let expected: f64 = (0..2).map(|i| a.get(&[i, j, k])).sum();
                assert_relative_eq!(s.get(&[k, 0, j]), expected);
            }
        }
        assert!(matches!(
            v.sum_axes(&[3]),
            Err(PermError::InvalidAxis { axis: 3, rank: 3 })
        ));
    }

    #[test]
    fn test_reduce_into_row_major_dest() {
        let a = make_3d();
        let v = a.permuted([1, 2, 0]).unwrap(); // dims [3, 4, 2]
        let mut out = StridedArray::<f64>::row_major(&[3, 1, 1]);
        v.reduce_into(&mut out.view_mut(), |x| x, |x, y| x + y)
            .unwrap();
        for j in 0..3 {
            let mut expected = 0.0;
            for i in 0..2 {
                for k in 0..4 {
                    expected += a.get(&[i, j, k]);
                }
            }
            assert_relative_eq!(out.get(&[j, 0, 0]), expected);
        }
    }

    #[test]
    fn test_complex_elements() {
        let a = StridedArray::<Complex64>::from_fn_row_major(&[2, 3], |idx| {
            Complex64::new(idx[0] as f64, idx[1] as f64)
        });
        let v = a.permuted([1, 0]).unwrap();
        assert_eq!(v.get(&[2, 1]), Complex64::new(1.0, 2.0));
        assert_eq!(v.sum(), Complex64::new(3.0, 6.0));
    }
}
