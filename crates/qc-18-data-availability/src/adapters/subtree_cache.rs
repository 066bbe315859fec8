//! Per-call subtree root cache over an extended square
//!
//! Row trees are built on first use and kept in array form: node `i` has
//! children `2i + 1` and `2i + 2`, leaves occupy the last `width` slots.
//! The cache lives as long as the square it borrows and is dropped with it.

use crate::domain::placement::is_power_of_two;
use crate::domain::{DataAvailabilityHeader, ExtendedDataSquare};
use crate::error::{DataAvailabilityError, Result};
use crate::ports::{SubtreeRootReader, TreeHasher};
use crate::Hash;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Memoizing [`SubtreeRootReader`] for one extended square
pub struct EdsSubtreeRootCacher<'a> {
    eds: &'a ExtendedDataSquare,
    hasher: &'a dyn TreeHasher,
    rows: RefCell<HashMap<usize, Rc<Vec<Hash>>>>,
}

impl<'a> EdsSubtreeRootCacher<'a> {
    /// Create an empty cache over `eds`
    pub fn new(eds: &'a ExtendedDataSquare, hasher: &'a dyn TreeHasher) -> Self {
        Self {
            eds,
            hasher,
            rows: RefCell::new(HashMap::new()),
        }
    }

    /// Rows whose trees have been built so far
    pub fn cached_rows(&self) -> usize {
        self.rows.borrow().len()
    }

    fn row_tree(&self, row: usize) -> Result<Rc<Vec<Hash>>> {
        if let Some(tree) = self.rows.borrow().get(&row) {
            return Ok(Rc::clone(tree));
        }

        let shares = self
            .eds
            .row(row)
            .ok_or_else(|| {
                DataAvailabilityError::SubtreeLookup(format!("row {row} out of range"))
            })?;
        let leaf_count = shares.len();
        if !is_power_of_two(leaf_count) || leaf_count < 2 {
            return Err(DataAvailabilityError::SubtreeLookup(format!(
                "row width {leaf_count} is not a power of two"
            )));
        }

        let leaf_start = leaf_count - 1;
        let mut nodes = vec![[0u8; 32]; 2 * leaf_count - 1];
        for (i, share) in shares.iter().enumerate() {
            nodes[leaf_start + i] = self.hasher.hash_leaf(share.as_bytes());
        }
        for i in (0..leaf_start).rev() {
            nodes[i] = self.hasher.hash_node(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        let tree = Rc::new(nodes);
        self.rows.borrow_mut().insert(row, Rc::clone(&tree));
        Ok(tree)
    }
}

impl SubtreeRootReader for EdsSubtreeRootCacher<'_> {
    fn subtree_root(
        &self,
        dah: &DataAvailabilityHeader,
        row: usize,
        path: &[bool],
    ) -> Result<Hash> {
        let expected_root = dah.row_roots.get(row).ok_or_else(|| {
            DataAvailabilityError::SubtreeLookup(format!("header has no row {row}"))
        })?;
        let nodes = self.row_tree(row)?;
        if nodes[0] != *expected_root {
            return Err(DataAvailabilityError::SubtreeLookup(format!(
                "row {row} root does not match header"
            )));
        }

        let mut index = 0usize;
        for &right in path {
            index = 2 * index + if right { 2 } else { 1 };
            if index >= nodes.len() {
                return Err(DataAvailabilityError::SubtreeLookup(format!(
                    "path of depth {} exceeds row tree",
                    path.len()
                )));
            }
        }
        Ok(nodes[index])
    }
}
