//! Implements a keccak256 merkle tree whose internal nodes hash their children in sorted order,
//! compatible with `merkletreejs` (`sortPairs: true`) and OpenZeppelin's `MerkleProof`.

/// Defines errors that might arise when querying a tree or checking a proof.
pub mod error;
/// Defines inclusion proofs on the tree.
pub mod proof;
/// Defines the merkle tree itself.
pub mod tree;
/// Utilities for computing facts about trees from their size.
pub mod utils;
