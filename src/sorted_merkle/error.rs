/// An error that occurred while querying a merkle tree or checking a claimed inclusion proof.
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum MerkleError {
    /// The tree has not been built since leaves were last added. Call `build` and retry
    #[error("merkle tree has not been built")]
    NotBuilt,
    /// A proof was requested for a leaf the tree doesn't have
    #[error("leaf index {index} is out of range for a tree of {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The number of leaves in the tree
        leaf_count: usize,
    },
    /// No leaf in the tree hashes to the requested value
    #[error("value is not a leaf of the tree")]
    ValueNotFound,
    /// The tree has no leaves, so it has no root
    #[error("merkle tree is empty")]
    EmptyTree,
    /// The claimed proof does not verify against the provided root
    #[error("proof does not verify against the root")]
    InvalidRoot,
}
