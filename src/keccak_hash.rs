use sha3::{Digest as _, Keccak256};

use crate::digest::{Address, Digest};
use crate::maybestd::vec::Vec;

/// The keccak256 hash of the empty string
pub const EMPTY_KECCAK: Digest = Digest([
    197, 210, 70, 1, 134, 247, 35, 60, 146, 126, 125, 178, 220, 199, 3, 192, 229, 0, 182, 83, 202,
    130, 39, 59, 123, 250, 216, 4, 93, 133, 164, 112,
]);

/// A value which can be committed to as a leaf of the tree.
///
/// The packed encoding must match Solidity's `abi.encodePacked` for the equivalent type,
/// since on-chain verifiers recompute leaves as `keccak256(abi.encodePacked(value))`.
pub trait LeafValue {
    /// Returns the packed encoding of the value
    fn packed(&self) -> &[u8];
}

impl LeafValue for Address {
    fn packed(&self) -> &[u8] {
        &self.0
    }
}

impl LeafValue for Digest {
    fn packed(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> LeafValue for [u8; N] {
    fn packed(&self) -> &[u8] {
        self
    }
}

impl LeafValue for [u8] {
    fn packed(&self) -> &[u8] {
        self
    }
}

impl LeafValue for Vec<u8> {
    fn packed(&self) -> &[u8] {
        self
    }
}

impl LeafValue for bytes::Bytes {
    fn packed(&self) -> &[u8] {
        self
    }
}

impl<T: LeafValue + ?Sized> LeafValue for &T {
    fn packed(&self) -> &[u8] {
        (**self).packed()
    }
}

/// Computes keccak256 over the given bytes
pub fn keccak256(bytes: &[u8]) -> Digest {
    let result: [u8; 32] = Keccak256::digest(bytes).into();
    Digest(result)
}

/// Hashes a value into a leaf of the tree
pub fn hash_leaf<V: LeafValue + ?Sized>(value: &V) -> Digest {
    keccak256(value.packed())
}

/// Hashes two nodes into their parent. The smaller digest is always hashed first, so
/// `hash_pair(a, b) == hash_pair(b, a)` and a verifier never needs to know which side a
/// sibling was on.
pub fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(first);
    hasher.update(second);
    let result: [u8; 32] = hasher.finalize().into();
    Digest(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(s: &str) -> Digest {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_keccak() {
        assert_eq!(keccak256(&[]), EMPTY_KECCAK);
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn test_hash_address_leaf() {
        assert_eq!(
            hash_leaf(&Address::ZERO),
            digest("5380c7b7ae81a58eb98d9c78de4a1fd7fd9535fc953ed2be602daaa41767312a")
        );
        // An address hashes exactly like its 20 raw bytes
        assert_eq!(hash_leaf(&Address::ZERO), hash_leaf(&[0u8; 20]));
        assert_eq!(hash_leaf(&Address::ZERO), hash_leaf(&vec![0u8; 20]));
    }

    #[test]
    fn test_hash_bytes32_leaf() {
        let value = Digest([0x11; 32]);
        assert_eq!(
            hash_leaf(&value),
            digest("b569321de72d0af89c2fb48a484de3fc9343f31600ae1f3e13d633cb48cbf816")
        );
        assert_eq!(hash_leaf(&value), hash_leaf(&bytes::Bytes::from(vec![0x11; 32])));
    }

    #[test]
    fn test_hash_pair_is_sorted() {
        let a = Digest([1; 32]);
        let b = Digest([2; 32]);
        let expected = digest("346d8c96a2454213fcc0daff3c96ad0398148181b9fa6488f7ae2c0af5b20aa0");
        assert_eq!(hash_pair(&a, &b), expected);
        assert_eq!(hash_pair(&b, &a), expected);
        assert_eq!(expected, keccak256(&[[1u8; 32], [2u8; 32]].concat()));
    }

    #[test]
    fn test_hash_pair_commutes() {
        for i in 0u8..16 {
            let a = keccak256(&[i]);
            let b = keccak256(&[i, i]);
            assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        }
        let same = keccak256(b"same");
        assert_eq!(
            hash_pair(&same, &same),
            keccak256(&[same.0, same.0].concat())
        );
    }
}
