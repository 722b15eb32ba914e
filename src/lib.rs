#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
//! This crate implements a keccak256 merkle tree whose inclusion proofs can be checked on-chain.
//!
//! Leaves are `keccak256(abi.encodePacked(value))` and internal nodes hash their two children
//! in sorted order, which matches `merkletreejs` with `sortPairs: true` and OpenZeppelin's
//! `MerkleProof.verify`. Leaves are never sorted: the insertion order is part of the commitment.
//! When a level has an odd number of nodes, the last one is carried up to the next level
//! unchanged instead of being hashed with a copy of itself.
//!
//! ```
//! use evm_merkle_rs::{hash_leaf, Address, MerkleTree};
//!
//! let mut tree = MerkleTree::new();
//! tree.add_leaves((1u8..=5).map(|i| Address([i; 20])));
//! let root = tree.build().root().expect("tree has leaves");
//!
//! let value = Address([3; 20]);
//! let proof = tree.proof_for_value(&value).unwrap();
//! assert!(proof.verify(&hash_leaf(&value), &root));
//! ```
//!
//! Proofs can also be checked without a tree, against a root from any source, using
//! [`verify_proof`] or, for the untagged form, [`verify_bare_proof`].

#[cfg(not(feature = "std"))]
extern crate alloc;

mod maybestd {
    #[cfg(not(feature = "std"))]
    pub use alloc::{boxed, string, vec};
    #[cfg(feature = "serde")]
    pub use core::marker;
    pub use core::{fmt, str};
    #[cfg(feature = "std")]
    pub use std::{boxed, string, vec};
}

/// Defines the digest and address types.
pub mod digest;
/// Defines the keccak256 leaf and node hashing rules.
pub mod keccak_hash;
/// Implements the sorted-pair merkle tree and its proofs.
pub mod sorted_merkle;

pub use digest::{Address, Digest, ParseError, ADDRESS_LEN, HASH_LEN};
pub use keccak_hash::{hash_leaf, hash_pair, keccak256, LeafValue, EMPTY_KECCAK};
pub use sorted_merkle::{
    error::MerkleError,
    proof::{verify_bare_proof, verify_proof, Proof, ProofStep, Side},
    tree::{BuiltTree, MerkleTree},
};
