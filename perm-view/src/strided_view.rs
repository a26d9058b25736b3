//! Dynamic-rank strided arrays that back permuted views.
//!
//! - [`StridedView`]: shared borrowed view
//! - [`StridedViewMut`]: exclusive borrowed view
//! - [`StridedArray`]: owned buffer with dims/strides/offset

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use perm_core::{Perm, PermError, Result};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that all accessed offsets stay within `[0, len)`.
///
/// An empty view accesses nothing, but its base pointer is still formed, so
/// `offset` must lie in `[0, len]`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(PermError::StrideLengthMismatch);
    }
    if offset < 0 || offset as usize > len {
        return Err(PermError::OffsetOverflow);
    }
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(PermError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(PermError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(PermError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 || max_offset as usize >= len {
        return Err(PermError::OffsetOverflow);
    }
    Ok(())
}

/// Linear offset of `indices`, panicking on a wrong index count or out-of-range index.
#[inline]
fn checked_offset(dims: &[usize], strides: &[isize], indices: &[usize]) -> isize {
    assert_eq!(indices.len(), dims.len(), "wrong number of indices");
    let mut idx = 0isize;
    for (i, &index) in indices.iter().enumerate() {
        assert!(
            index < dims[i],
            "index {} out of bounds for dim {}",
            index,
            dims[i]
        );
        idx += index as isize * strides[i];
    }
    idx
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

// ============================================================================
// StridedView
// ============================================================================

/// Dynamic-rank immutable strided view over a borrowed slice.
pub struct StridedView<'a, T> {
    ptr: *const T,
    data: &'a [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

unsafe impl<T: Send> Send for StridedView<'_, T> {}
unsafe impl<T: Sync> Sync for StridedView<'_, T> {}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            data: self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a new immutable strided view from a borrowed slice.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        let ptr = unsafe { data.as_ptr().offset(offset) };
        Ok(Self {
            ptr,
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    /// Same buffer and offset, new dims/strides. Callers pass a reordering of
    /// the current layout, which keeps every offset in bounds.
    pub(crate) fn relayout(&self, dims: &[usize], strides: &[isize]) -> StridedView<'a, T> {
        StridedView {
            ptr: self.ptr,
            data: self.data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset: self.offset,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Raw const pointer to element at the view's base offset.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr
    }

    /// Permute dimensions in place of metadata (zero-copy).
    ///
    /// Output dimension `i` is input dimension `perm.get(i)`.
    pub fn permute(&self, perm: &Perm) -> Result<StridedView<'a, T>> {
        let dims = perm.apply(self.dims())?;
        let strides = perm.apply(self.strides())?;
        Ok(self.relayout(&dims, &strides))
    }
}

impl<T: Copy> StridedView<'_, T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        let idx = checked_offset(&self.dims, &self.strides, indices);
        unsafe { *self.ptr.offset(idx) }
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Dynamic-rank mutable strided view over an exclusively borrowed slice.
pub struct StridedViewMut<'a, T> {
    ptr: *mut T,
    data: &'a mut [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

unsafe impl<T: Send> Send for StridedViewMut<'_, T> {}

impl<T> std::fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a new mutable strided view.
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        let ptr = unsafe { data.as_mut_ptr().offset(offset) };
        Ok(Self {
            ptr,
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    /// Consuming counterpart of [`StridedView::relayout`].
    pub(crate) fn relayout(self, dims: &[usize], strides: &[isize]) -> StridedViewMut<'a, T> {
        StridedViewMut {
            ptr: self.ptr,
            data: self.data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset: self.offset,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Raw const pointer to element at the view's base offset.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr as *const T
    }

    /// Raw mutable pointer to element at the view's base offset.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr
    }

    /// Permute dimensions, consuming the mutable view.
    ///
    /// Takes `self` by value to prevent aliasing of mutable views.
    pub fn permute(self, perm: &Perm) -> Result<StridedViewMut<'a, T>> {
        let dims = perm.apply(self.dims())?;
        let strides = perm.apply(self.strides())?;
        Ok(self.relayout(&dims, &strides))
    }

    /// Shorter-lived mutable view of the same elements.
    pub fn reborrow(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            ptr: self.ptr,
            data: &mut *self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            ptr: self.ptr as *const T,
            data: &*self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy> StridedViewMut<'_, T> {
    /// Get an element.
    pub fn get(&self, indices: &[usize]) -> T {
        let idx = checked_offset(&self.dims, &self.strides, indices);
        unsafe { *self.ptr.offset(idx) }
    }

    /// Set an element.
    pub fn set(&mut self, indices: &[usize], value: T) {
        let idx = checked_offset(&self.dims, &self.strides, indices);
        unsafe {
            *self.ptr.offset(idx) = value;
        }
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided multidimensional array.
///
/// Supports column-major, row-major and arbitrary in-bounds layouts.
pub struct StridedArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> std::fmt::Debug for StridedArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedArray")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Clone> Clone for StridedArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

/// Fill a freshly allocated buffer, calling `f` with indices in the order
/// given by `axes` (fastest-varying axis first).
fn fill_in_order<T>(
    dims: &[usize],
    axes: impl Iterator<Item = usize> + Clone,
    mut f: impl FnMut(&[usize]) -> T,
) -> Vec<T> {
    let total: usize = dims.iter().product();
    let mut data = Vec::with_capacity(total);
    let mut idx = vec![0usize; dims.len()];
    for _ in 0..total {
        data.push(f(&idx));
        for d in axes.clone() {
            idx[d] += 1;
            if idx[d] < dims[d] {
                break;
            }
            idx[d] = 0;
        }
    }
    data
}

impl<T: Clone + Default> StridedArray<T> {
    /// Create a column-major array filled with default values.
    pub fn col_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create a row-major array filled with default values.
    pub fn row_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }
}

impl<T> StridedArray<T> {
    /// Create a column-major array with values produced by a function.
    ///
    /// The function is called with indices in column-major iteration order.
    pub fn from_fn_col_major(dims: &[usize], f: impl FnMut(&[usize]) -> T) -> Self {
        Self {
            data: fill_in_order(dims, 0..dims.len(), f),
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create a row-major array with values produced by a function.
    ///
    /// The function is called with indices in row-major iteration order.
    pub fn from_fn_row_major(dims: &[usize], f: impl FnMut(&[usize]) -> T) -> Self {
        Self {
            data: fill_in_order(dims, (0..dims.len()).rev(), f),
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create from raw parts.
    pub fn from_parts(
        data: Vec<T>,
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Create an immutable view over this array.
    pub fn view(&self) -> StridedView<'_, T> {
        let ptr = unsafe { self.data.as_ptr().offset(self.offset) };
        StridedView {
            ptr,
            data: &self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Create a mutable view over this array.
    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        let ptr = unsafe { self.data.as_mut_ptr().offset(self.offset) };
        StridedViewMut {
            ptr,
            data: &mut self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy> StridedArray<T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        self.view().get(indices)
    }

    /// Set an element by multi-dimensional index.
    pub fn set(&mut self, indices: &[usize], value: T) {
        self[indices] = value;
    }
}

impl<T> Index<&[usize]> for StridedArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        let idx = self.offset + checked_offset(&self.dims, &self.strides, indices);
        &self.data[idx as usize]
    }
}

impl<T> IndexMut<&[usize]> for StridedArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        let idx = self.offset + checked_offset(&self.dims, &self.strides, indices);
        &mut self.data[idx as usize]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[3, 4]), vec![1, 3]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
        assert!(col_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[3, 4]), vec![4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
    }

    #[test]
    fn test_strided_view_get() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::<f64>::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        assert_eq!(view.ndim(), 2);
        assert_eq!(view.len(), 6);
        assert_eq!(view.get(&[0, 0]), 1.0);
        assert_eq!(view.get(&[0, 2]), 3.0);
        assert_eq!(view.get(&[1, 0]), 4.0);
        assert_eq!(view.get(&[1, 2]), 6.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_strided_view_get_out_of_bounds() {
        let data = vec![0.0; 6];
        let view = StridedView::<f64>::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        view.get(&[2, 0]);
    }

    #[test]
    fn test_strided_view_permute() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::<f64>::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        let t = view.permute(&Perm::new([1, 0])).unwrap();
        assert_eq!(t.dims(), &[3, 2]);
        assert_eq!(t.strides(), &[1, 3]);
        assert_eq!(t.get(&[1, 0]), 2.0);
        assert_eq!(t.get(&[0, 1]), 4.0);
    }

    #[test]
    fn test_strided_view_permute_errors() {
        let data = vec![0.0; 6];
        let view = StridedView::<f64>::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        assert!(matches!(
            view.permute(&Perm::new([0, 1, 2])),
            Err(PermError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            view.permute(&Perm::new([1, 1])),
            Err(PermError::InvalidPermutation(_))
        ));
        assert_eq!(view.permute(&Perm::NoPerm).unwrap().dims(), &[2, 3]);
    }

    #[test]
    fn test_strided_view_mut_set_and_permute() {
        let mut data = vec![0.0; 6];
        {
            let vm = StridedViewMut::<f64>::new(&mut data, &[2, 3], &[3, 1], 0).unwrap();
            let mut t = vm.permute(&Perm::new([1, 0])).unwrap();
            t.set(&[2, 1], 6.0);
            t.set(&[0, 0], 1.0);
            assert_eq!(t.get(&[2, 1]), 6.0);
        }
        assert_eq!(data[0], 1.0);
        assert_eq!(data[5], 6.0);
    }

    #[test]
    fn test_strided_view_mut_reborrow() {
        let mut data = vec![0; 4];
        let mut vm = StridedViewMut::new(&mut data, &[2, 2], &[1, 2], 0).unwrap();
        {
            let mut inner = vm.reborrow();
            inner.set(&[1, 1], 9);
        }
        assert_eq!(vm.as_view().get(&[1, 1]), 9);
        vm.set(&[0, 1], 3);
        assert_eq!(data, vec![0, 0, 3, 9]);
    }

    #[test]
    fn test_from_fn_orders() {
        let c = StridedArray::<f64>::from_fn_col_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        assert_eq!(c.strides(), &[1, 2]);
        assert_eq!(c.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        let r = StridedArray::<f64>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        assert_eq!(r.strides(), &[3, 1]);
        assert_eq!(r.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(c.get(&[i, j]), r.get(&[i, j]));
            }
        }
    }

    #[test]
    fn test_zero_rank_array() {
        let a = StridedArray::<i32>::from_fn_col_major(&[], |_| 42);
        assert_eq!(a.len(), 1);
        assert_eq!(a.get(&[]), 42);
    }

    #[test]
    fn test_strided_array_index() {
        let mut t = StridedArray::<f64>::row_major(&[2, 3]);
        t[&[1usize, 2] as &[usize]] = 99.0;
        t.set(&[0, 1], 7.0);
        assert_eq!(t.get(&[1, 2]), 99.0);
        assert_eq!(t[&[0usize, 1] as &[usize]], 7.0);
    }

    #[test]
    fn test_from_parts_with_offset() {
        let a = StridedArray::from_parts((0..8).collect::<Vec<i32>>(), &[2, 3], &[1, 2], 2).unwrap();
        assert_eq!(a.get(&[0, 0]), 2);
        assert_eq!(a.get(&[1, 2]), 7);
        assert!(StridedArray::from_parts(vec![0; 6], &[2, 3], &[1, 2], 1).is_err());
    }

    #[test]
    fn test_view_keeps_buffer_and_offset() {
        let data: Vec<i32> = (0..8).collect();
        let view = StridedView::new(&data, &[2, 2], &[1, 2], 2).unwrap();
        assert_eq!(view.offset(), 2);
        assert_eq!(view.data().as_ptr(), data.as_ptr());
        assert_eq!(view.data().len(), 8);
        assert_eq!(view.data()[view.offset() as usize], view.get(&[0, 0]));
    }

    #[test]
    fn test_empty_view_offset_checked() {
        let empty: [f64; 0] = [];
        assert_eq!(
            StridedView::new(&empty, &[0], &[1], 100).err(),
            Some(PermError::OffsetOverflow)
        );
        assert!(StridedView::new(&empty, &[0], &[1], 0).is_ok());

        let mut buf = vec![0u8; 4];
        assert!(StridedViewMut::new(&mut buf, &[3, 0], &[1, 3], 5).is_err());
        assert!(StridedViewMut::new(&mut buf, &[3, 0], &[1, 3], 4).is_ok());
        assert!(StridedArray::from_parts(Vec::<u8>::new(), &[0, 2], &[1, 1], -1).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(6, &[2, 3], &[3, 1], 0).is_ok());
        assert!(validate_bounds(5, &[2, 3], &[3, 1], 0).is_err());
        assert!(validate_bounds(0, &[0, 3], &[3, 1], 0).is_ok());
        assert!(validate_bounds(4, &[0, 2], &[1, 1], 4).is_ok());
        assert_eq!(
            validate_bounds(0, &[0], &[1], 100),
            Err(PermError::OffsetOverflow)
        );
        assert_eq!(
            validate_bounds(6, &[0, 3], &[3, 1], -1),
            Err(PermError::OffsetOverflow)
        );
        assert!(validate_bounds(7, &[2, 3], &[3, 1], 1).is_ok());
        assert_eq!(
            validate_bounds(6, &[2, 3], &[1], 0),
            Err(PermError::StrideLengthMismatch)
        );
    }
}
