//! Non-interactive blob placement
//!
//! A blob of `L` shares may only start at a column that is a multiple of the
//! largest power of two `<= min(L, k)`, and only if it then fits in the rest
//! of the row. Otherwise it starts at column 0 of the next row. Any verifier
//! holding the blob lengths in namespace order can recompute every start
//! index without consulting the proposer.
//!
//! All cursors here are absolute share indices in row-major order.

/// `v` is a non-zero power of two
#[inline]
pub fn is_power_of_two(v: usize) -> bool {
    v != 0 && v & (v - 1) == 0
}

/// Smallest power of two `>= v`; 0 and 1 both map to 1.
pub fn next_power_of_two(v: usize) -> usize {
    let mut k = 1usize;
    while k < v {
        k <<= 1;
    }
    k
}

/// Largest power of two `<= v`; 0 and 1 both map to 1.
pub fn next_lower_power_of_two(v: usize) -> usize {
    let c = next_power_of_two(v);
    if c == v || c == 1 {
        c
    } else {
        c / 2
    }
}

/// Round `cursor` up to the next multiple of `v`. Already aligned cursors
/// (including 0) are returned unchanged.
pub fn round_up_by(cursor: usize, v: usize) -> usize {
    if v == 0 || cursor % v == 0 {
        cursor
    } else {
        (cursor / v + 1) * v
    }
}

/// Start index of a blob of `blob_len` shares placed at or after `cursor` in
/// a square of width `square_size`.
///
/// Returns `(index, true)` when the blob can start on the cursor's row, and
/// `(start of next row, false)` when the aligned offset plus the blob length
/// would cross the row boundary.
pub fn next_aligned_index(cursor: usize, blob_len: usize, square_size: usize) -> (usize, bool) {
    if square_size == 0 {
        return (cursor, false);
    }
    let column = cursor % square_size;
    let row_start = cursor - column;
    if column == 0 {
        return (cursor, true);
    }

    let alignment = next_lower_power_of_two(blob_len.min(square_size));
    let aligned = round_up_by(column, alignment);
    if aligned + blob_len > square_size {
        return (row_start + square_size, false);
    }
    (row_start + aligned, true)
}

/// Whether blobs of the given share lengths, in order, fit into a square of
/// width `square_size` when placement begins at `cursor`.
///
/// Every blob must start on a row `< square_size` and the cursor after the
/// last blob must not pass `square_size²`.
pub fn fits_in_square(cursor: usize, square_size: usize, blob_lens: &[usize]) -> bool {
    if square_size == 0 {
        return false;
    }
    let capacity = square_size * square_size;
    let mut cursor = cursor;
    for &len in blob_lens {
        if cursor / square_size >= square_size {
            return false;
        }
        let (start, _) = next_aligned_index(cursor, len, square_size);
        if start / square_size >= square_size {
            return false;
        }
        cursor = start + len;
    }
    cursor <= capacity
}

/// Start index of every blob, in order, plus the cursor after the last one.
///
/// Placement is unbounded: callers compare the returned end against the
/// square capacity.
pub fn blob_start_indices(
    cursor: usize,
    square_size: usize,
    blob_lens: &[usize],
) -> (usize, Vec<usize>) {
    let mut cursor = cursor;
    let mut starts = Vec::with_capacity(blob_lens.len());
    for &len in blob_lens {
        let (start, _) = next_aligned_index(cursor, len, square_size);
        starts.push(start);
        cursor = start + len;
    }
    (cursor, starts)
}
