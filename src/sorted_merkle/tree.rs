use super::error::MerkleError;
use super::proof::{Proof, ProofStep};
use super::utils::level_lengths;
use crate::digest::Digest;
use crate::keccak_hash::{hash_leaf, hash_pair, LeafValue};
use crate::maybestd::{boxed::Box, fmt, vec::Vec};

type BoxedVisitor = Box<dyn Fn(&Digest) + Send>;

/// Accumulates the leaves of a sorted-pair merkle tree.
///
/// Leaves keep their insertion order, which is part of the commitment: the same values
/// pushed in a different order produce a different root. Values are never deduplicated.
/// Calling [`MerkleTree::build`] freezes the current leaves into a [`BuiltTree`]; pushing
/// another leaf discards that snapshot until the next build.
pub struct MerkleTree {
    leaves: Vec<Digest>,
    built: Option<BuiltTree>,
    visitor: BoxedVisitor,
}

impl Default for MerkleTree {
    fn default() -> Self {
        Self {
            leaves: Default::default(),
            built: None,
            visitor: Box::new(|_| {}),
        }
    }
}

impl fmt::Debug for MerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("leaves", &self.leaves)
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}

impl MerkleTree {
    /// Constructs an empty, unbuilt merkle tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure which observes every internal node computed by [`MerkleTree::build`]
    pub fn set_visitor(&mut self, visitor: impl Fn(&Digest) + Send + 'static) {
        self.visitor = Box::new(visitor);
    }

    /// Removes all leaves and any built snapshot
    pub fn reset(&mut self) {
        self.leaves.clear();
        self.built = None;
    }

    /// Hashes the value and appends it to the tree
    pub fn push_leaf<V: LeafValue + ?Sized>(&mut self, value: &V) {
        self.push_leaf_hash(hash_leaf(value));
    }

    /// Appends an already hashed leaf to the tree
    pub fn push_leaf_hash(&mut self, leaf: Digest) {
        self.built = None;
        self.leaves.push(leaf);
    }

    /// Hashes each value and appends it to the tree, preserving the order given
    pub fn add_leaves<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: LeafValue,
    {
        self.built = None;
        self.leaves
            .extend(values.into_iter().map(|value| hash_leaf(&value)));
    }

    /// Returns the number of leaves, whether or not the tree is built
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the leaf at the given index
    pub fn leaf(&self, index: usize) -> Option<Digest> {
        self.leaves.get(index).copied()
    }

    /// Returns all leaves in the tree
    pub fn leaves(&self) -> &[Digest] {
        &self.leaves
    }

    /// Returns the index of the first leaf matching the value
    pub fn index_of<V: LeafValue + ?Sized>(&self, value: &V) -> Option<usize> {
        find_leaf(&self.leaves, value)
    }

    /// Returns true if the tree has been built since the last leaf was added
    pub fn is_ready(&self) -> bool {
        self.built.is_some()
    }

    /// Computes every level of the tree from the current leaves
    pub fn build(&mut self) -> &BuiltTree {
        let built = BuiltTree::build_with_visitor(self.leaves.clone(), &*self.visitor);
        self.built.insert(built)
    }

    /// Returns the snapshot produced by the last build, if no leaves were added since
    pub fn built(&self) -> Result<&BuiltTree, MerkleError> {
        self.built.as_ref().ok_or(MerkleError::NotBuilt)
    }

    /// Returns the root of the built tree
    pub fn root(&self) -> Result<Digest, MerkleError> {
        self.built()?.root().ok_or(MerkleError::EmptyTree)
    }

    /// Builds an inclusion proof for the leaf at the given index
    pub fn proof_for_index(&self, index: usize) -> Result<Proof, MerkleError> {
        self.built()?.proof_for_index(index)
    }

    /// Builds an inclusion proof for the first leaf matching the value. See
    /// [`BuiltTree::proof_for_value`] for the behavior on values which aren't in the tree.
    pub fn proof_for_value<V: LeafValue + ?Sized>(&self, value: &V) -> Result<Proof, MerkleError> {
        Ok(self.built()?.proof_for_value(value))
    }
}

/// An immutable snapshot of a built tree: every level from the leaves up to the root.
///
/// Level 0 holds the leaves and the last level holds only the root. Each level is built by
/// hashing adjacent pairs of the level below it; when a level has an odd length, its last node
/// is carried up unchanged rather than being hashed with itself, so
/// `len(level[i + 1]) == ceil(len(level[i]) / 2)`.
///
/// Example: the tree over five leaves `[A, B, C, D, E]`
/// ```ascii
///              root
///            /      \
///          H          E
///        /   \        |
///       F     G       E
///      / \   / \      |
///     A   B C   D     E
/// ```
/// `E` has no sibling until the level below the root, so its proof is the single step `[H]`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BuiltTree {
    levels: Vec<Vec<Digest>>,
}

impl BuiltTree {
    /// Computes every level of the tree over the given leaves
    pub fn build(leaves: Vec<Digest>) -> Self {
        Self::build_with_visitor(leaves, &|_| {})
    }

    fn build_with_visitor(leaves: Vec<Digest>, visitor: &dyn Fn(&Digest)) -> Self {
        let lengths = level_lengths(leaves.len());
        let mut levels = Vec::with_capacity(lengths.len());
        if !leaves.is_empty() {
            levels.push(leaves);
        }
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Digest> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => {
                        let parent = hash_pair(left, right);
                        visitor(&parent);
                        parent
                    }
                    // The odd node out is carried up as is
                    [solo] => *solo,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }
        debug_assert_eq!(
            levels.iter().map(Vec::len).collect::<Vec<_>>(),
            lengths,
            "level sizes must follow the ceil(n / 2) recurrence"
        );
        log::debug!(
            "built merkle tree with {} leaves and {} levels",
            levels.first().map_or(0, Vec::len),
            levels.len()
        );
        Self { levels }
    }

    /// Returns the root of the tree, or `None` if the tree has no leaves
    pub fn root(&self) -> Option<Digest> {
        self.levels.last().and_then(|top| top.first()).copied()
    }

    /// Returns the number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Returns the number of levels, counting both the leaves and the root. Zero for an empty tree
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Returns the leaves of the tree
    pub fn leaves(&self) -> &[Digest] {
        self.level(0).unwrap_or_default()
    }

    /// Returns the nodes of the given level, where level 0 holds the leaves
    pub fn level(&self, level: usize) -> Option<&[Digest]> {
        self.levels.get(level).map(Vec::as_slice)
    }

    /// Returns every level, from the leaves up to the root
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Returns the index of the first leaf matching the value
    pub fn index_of<V: LeafValue + ?Sized>(&self, value: &V) -> Option<usize> {
        find_leaf(self.leaves(), value)
    }

    /// Builds an inclusion proof for the leaf at the given index. Sibling sides are
    /// relative to the node being proven, and the proof is ordered from the leaf up.
    pub fn proof_for_index(&self, index: usize) -> Result<Proof, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }
        let mut steps = Vec::with_capacity(self.height());
        let mut idx = index;
        // Every level except the root contributes at most one sibling
        let below_root = self.levels.split_last().map_or(&[][..], |(_, rest)| rest);
        for level in below_root {
            let len = level.len();
            let carried = idx == len - 1 && len % 2 == 1;
            if !carried {
                let step = if idx & 1 == 1 {
                    ProofStep::Left(level[idx - 1])
                } else {
                    ProofStep::Right(level[idx + 1])
                };
                steps.push(step);
            }
            idx >>= 1;
        }
        log::trace!("built proof of {} steps for leaf {}", steps.len(), index);
        Ok(Proof::new(steps))
    }

    /// Builds an inclusion proof for the first leaf matching the value.
    ///
    /// If the value is not in the tree the proof is empty. An empty proof only verifies when
    /// the leaf is the root, so it can never prove membership of a missing value; callers must
    /// still run it through [`Proof::verify`] rather than trusting it.
    pub fn proof_for_value<V: LeafValue + ?Sized>(&self, value: &V) -> Proof {
        self.index_of(value)
            .and_then(|index| self.proof_for_index(index).ok())
            .unwrap_or_default()
    }

    /// Fetches the index of the first leaf matching the value, along with a proof of inclusion
    pub fn get_value_with_proof<V: LeafValue + ?Sized>(
        &self,
        value: &V,
    ) -> Result<(usize, Proof), MerkleError> {
        let index = self.index_of(value).ok_or(MerkleError::ValueNotFound)?;
        Ok((index, self.proof_for_index(index)?))
    }
}

/// Prints the root, then every level from the leaves up
impl fmt::Display for BuiltTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root() else {
            return Ok(());
        };
        writeln!(f, "{}", root)?;
        for (idx, level) in self.levels.iter().enumerate() {
            write!(f, "Level: {}", idx)?;
            for node in level {
                write!(f, " {}", node)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn find_leaf<V: LeafValue + ?Sized>(leaves: &[Digest], value: &V) -> Option<usize> {
    let hash = hash_leaf(value);
    leaves.iter().position(|leaf| leaf == &hash)
}
