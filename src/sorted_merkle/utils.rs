use super::proof::Side;
use crate::maybestd::vec::Vec;

/// Compute the number of nodes on every level of a tree with the given number of leaves,
/// starting with the leaves and ending with the root. Empty for an empty tree.
pub fn level_lengths(leaf_count: usize) -> Vec<usize> {
    let mut lengths = Vec::new();
    if leaf_count == 0 {
        return lengths;
    }
    let mut len = leaf_count;
    lengths.push(len);
    while len > 1 {
        // An unpaired trailing node is carried up, so each level rounds up
        len = len.div_ceil(2);
        lengths.push(len);
    }
    lengths
}

/// Compute the sides of the siblings in an inclusion proof for the leaf at `index`, leaf first.
///
/// This works by interpreting the binary representation of the index as a *path* to the leaf:
/// if the lsb of the (remaining) path is a 1, the node is a right child and its sibling sits
/// to its left. The last node of an odd-length level has no sibling and contributes nothing.
/// Returns an empty path if the index is out of range.
pub fn path_sides(index: usize, leaf_count: usize) -> Vec<Side> {
    let mut sides = Vec::new();
    if index >= leaf_count {
        return sides;
    }
    let mut idx = index;
    let mut len = leaf_count;
    while len > 1 {
        let carried = idx == len - 1 && len % 2 == 1;
        if !carried {
            sides.push(if idx & 1 == 1 { Side::Left } else { Side::Right });
        }
        idx >>= 1;
        len = len.div_ceil(2);
    }
    sides
}
