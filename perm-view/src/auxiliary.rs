//! Offset iteration and layout predicates shared by views, reductions and copies.

use smallvec::SmallVec;

/// Total number of elements (1 for rank 0).
#[inline]
pub fn total_len(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Visit every multi-index of `dims` in column-major order, passing the
/// matching linear offsets into two arrays with `strides_a` and `strides_b`.
///
/// Rank 0 visits `(0, 0)` once; any zero extent visits nothing.
pub fn for_each_offset<F>(dims: &[usize], strides_a: &[isize], strides_b: &[isize], mut f: F)
where
    F: FnMut(isize, isize),
{
    debug_assert_eq!(dims.len(), strides_a.len());
    debug_assert_eq!(dims.len(), strides_b.len());
    let rank = dims.len();
    let total = total_len(dims);

    let mut idx: SmallVec<[usize; 8]> = SmallVec::from_elem(0, rank);
    let mut off_a = 0isize;
    let mut off_b = 0isize;

    for _ in 0..total {
        f(off_a, off_b);
        for d in 0..rank {
            idx[d] += 1;
            off_a += strides_a[d];
            off_b += strides_b[d];
            if idx[d] < dims[d] {
                break;
            }
            off_a -= (idx[d] as isize) * strides_a[d];
            off_b -= (idx[d] as isize) * strides_b[d];
            idx[d] = 0;
        }
    }
}

/// Visit every multi-index of `dims` in column-major order.
pub fn for_each_index<F>(dims: &[usize], mut f: F)
where
    F: FnMut(&[usize]),
{
    let rank = dims.len();
    let mut idx: SmallVec<[usize; 8]> = SmallVec::from_elem(0, rank);
    for _ in 0..total_len(dims) {
        f(&idx);
        for d in 0..rank {
            idx[d] += 1;
            if idx[d] < dims[d] {
                break;
            }
            idx[d] = 0;
        }
    }
}

/// Check if both stride sets describe the same dense column-major or
/// row-major layout of `dims` (size-1 axes ignored).
pub fn is_both_contiguous(dims: &[usize], strides_a: &[isize], strides_b: &[isize]) -> bool {
    if dims.is_empty() {
        return true;
    }
    let col = dims.iter().zip(strides_a.iter().zip(strides_b.iter()));
    let row = dims
        .iter()
        .rev()
        .zip(strides_a.iter().rev().zip(strides_b.iter().rev()));
    dense_in_order(col) || dense_in_order(row)
}

fn dense_in_order<'a>(order: impl Iterator<Item = (&'a usize, (&'a isize, &'a isize))>) -> bool {
    let mut expected = 1isize;
    for (&d, (&sa, &sb)) in order {
        if d <= 1 {
            continue;
        }
        if sa != expected || sb != expected {
            return false;
        }
        expected = expected.saturating_mul(d as isize);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_offset_order() {
        let mut seen = Vec::new();
        for_each_offset(&[2, 3], &[1, 2], &[3, 1], |a, b| seen.push((a, b)));
        assert_eq!(
            seen,
            vec![(0, 0), (1, 3), (2, 1), (3, 4), (4, 2), (5, 5)]
        );
    }

    #[test]
    fn test_for_each_offset_rank0_and_empty() {
        let mut count = 0;
        for_each_offset(&[], &[], &[], |a, b| {
            assert_eq!((a, b), (0, 0));
            count += 1;
        });
        assert_eq!(count, 1);
        for_each_offset(&[3, 0], &[1, 3], &[1, 3], |_, _| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_for_each_index() {
        let mut seen = Vec::new();
        for_each_index(&[2, 2], |idx| seen.push(idx.to_vec()));
        assert_eq!(seen, vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]);
    }

    #[test]
    fn test_is_both_contiguous() {
        assert!(is_both_contiguous(&[2, 3], &[1, 2], &[1, 2]));
        assert!(is_both_contiguous(&[2, 3], &[3, 1], &[3, 1]));
        assert!(!is_both_contiguous(&[2, 3], &[1, 2], &[3, 1]));
        assert!(!is_both_contiguous(&[2, 3], &[1, 4], &[1, 4]));
        assert!(is_both_contiguous(&[1, 3], &[7, 1], &[3, 1]));
        assert!(is_both_contiguous(&[], &[], &[]));
    }
}
