use super::{error::MerkleError, utils::path_sides};
use crate::digest::Digest;
use crate::keccak_hash::hash_pair;
use crate::maybestd::vec::Vec;

/// The position of a sibling relative to the node being proven
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Side {
    /// The sibling is to the left: the proven node is a right child
    Left,
    /// The sibling is to the right: the proven node is a left child
    Right,
}

/// One step of an inclusion proof: a sibling digest tagged with its side.
///
/// In human readable formats a step serializes as a single-key map, `{"left": "0x.."}`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ProofStep {
    /// A sibling to the left of the proven node
    Left(Digest),
    /// A sibling to the right of the proven node
    Right(Digest),
}

impl ProofStep {
    /// Returns the side of the sibling
    pub fn side(&self) -> Side {
        match self {
            ProofStep::Left(_) => Side::Left,
            ProofStep::Right(_) => Side::Right,
        }
    }

    /// Returns the sibling digest
    pub fn sibling(&self) -> &Digest {
        match self {
            ProofStep::Left(sibling) | ProofStep::Right(sibling) => sibling,
        }
    }
}

/// An inclusion proof for a single leaf: the siblings on the path from the leaf to the root,
/// leaf first. The proof of the only leaf of a one-leaf tree is empty.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Proof {
    steps: Vec<ProofStep>,
}

impl Proof {
    /// Wraps the given steps, leaf first
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    /// Returns the steps of the proof, leaf first
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Returns the number of steps in the proof
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the proof has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the sibling digests without their side tags. This is the form expected by
    /// verifiers which only rely on sorted pair hashing, such as OpenZeppelin's `MerkleProof`.
    pub fn siblings(&self) -> Vec<Digest> {
        self.steps.iter().map(|step| *step.sibling()).collect()
    }

    /// Verify that `leaf` is committed to by `root`
    #[must_use = "Must use the result of the proof verification"]
    pub fn verify(&self, leaf: &Digest, root: &Digest) -> bool {
        verify_proof(&self.steps, leaf, root)
    }

    /// Verify that `leaf` is committed to by `root`, returning an error on failure
    pub fn check(&self, leaf: &Digest, root: &Digest) -> Result<(), MerkleError> {
        if self.verify(leaf, root) {
            return Ok(());
        }
        Err(MerkleError::InvalidRoot)
    }

    /// Checks that the number and sides of the steps are the ones a tree of `leaf_count`
    /// leaves produces for the leaf at `index`. [`Proof::verify`] ignores the side tags,
    /// so this is only needed when the position of the leaf matters to the caller.
    pub fn matches_position(&self, index: usize, leaf_count: usize) -> bool {
        if index >= leaf_count {
            return false;
        }
        let expected = path_sides(index, leaf_count);
        expected.len() == self.steps.len()
            && expected
                .iter()
                .zip(&self.steps)
                .all(|(side, step)| *side == step.side())
    }
}

impl From<Vec<ProofStep>> for Proof {
    fn from(steps: Vec<ProofStep>) -> Self {
        Self::new(steps)
    }
}

impl IntoIterator for Proof {
    type Item = ProofStep;
    type IntoIter = crate::maybestd::vec::IntoIter<ProofStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Verify a tagged proof against a root from any source.
///
/// An empty proof succeeds only if the leaf is the root. Otherwise each sibling is hashed
/// with the running digest, in sorted order, and the result is compared to the root.
#[must_use = "Must use the result of the proof verification"]
pub fn verify_proof(steps: &[ProofStep], leaf: &Digest, root: &Digest) -> bool {
    fold_siblings(steps.iter().map(ProofStep::sibling), leaf, root)
}

/// Verify a proof given as bare sibling digests, leaf first
#[must_use = "Must use the result of the proof verification"]
pub fn verify_bare_proof(siblings: &[Digest], leaf: &Digest, root: &Digest) -> bool {
    fold_siblings(siblings.iter(), leaf, root)
}

fn fold_siblings<'a>(
    siblings: impl Iterator<Item = &'a Digest>,
    leaf: &Digest,
    root: &Digest,
) -> bool {
    let computed_root = siblings.fold(*leaf, |current, sibling| hash_pair(sibling, &current));
    let valid = &computed_root == root;
    log::trace!("proof for leaf {} against root {}: valid={}", leaf, root, valid);
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keccak_hash::keccak256;

    fn two_leaf_setup() -> (Digest, Digest, Digest) {
        let a = keccak256(b"a");
        let b = keccak256(b"b");
        (a, b, hash_pair(&a, &b))
    }

    #[test]
    fn test_empty_proof_requires_leaf_to_be_root() {
        let leaf = keccak256(b"only");
        let proof = Proof::default();
        assert!(proof.verify(&leaf, &leaf));
        assert!(!proof.verify(&keccak256(b"other"), &leaf));
        assert_eq!(
            proof.check(&keccak256(b"other"), &leaf),
            Err(MerkleError::InvalidRoot)
        );
    }

    #[test]
    fn test_side_tags_do_not_affect_verification() {
        let (a, b, root) = two_leaf_setup();
        let tagged = Proof::new(vec![ProofStep::Right(b)]);
        let mislabelled = Proof::new(vec![ProofStep::Left(b)]);
        assert!(tagged.verify(&a, &root));
        assert!(mislabelled.verify(&a, &root));
        assert!(verify_bare_proof(&tagged.siblings(), &a, &root));
        assert!(tagged.check(&a, &root).is_ok());
    }

    #[test]
    fn test_matches_position() {
        let (a, b, _) = two_leaf_setup();
        assert!(Proof::new(vec![ProofStep::Right(b)]).matches_position(0, 2));
        assert!(Proof::new(vec![ProofStep::Left(a)]).matches_position(1, 2));
        assert!(!Proof::new(vec![ProofStep::Left(a)]).matches_position(0, 2));
        assert!(!Proof::new(vec![ProofStep::Right(b)]).matches_position(2, 2));
        assert!(Proof::default().matches_position(0, 1));
    }

    #[test]
    fn test_proof_borsh() {
        let (a, b, _) = two_leaf_setup();
        let proof = Proof::new(vec![ProofStep::Left(a), ProofStep::Right(b)]);

        let serialized = borsh::to_vec(&proof).expect("Serialization to vec must succeed");
        let got: Proof = borsh::from_slice(&serialized).expect("serialized proof is correct");

        assert_eq!(got, proof);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_proof_serde_json_shape() {
        let left = Digest([0xab; 32]);
        let right = Digest([0x01; 32]);
        let proof = Proof::new(vec![ProofStep::Left(left), ProofStep::Right(right)]);

        let json = serde_json::to_value(&proof).expect("Serialization to json must succeed");
        assert_eq!(
            json,
            serde_json::json!([
                { "left": format!("0x{}", "ab".repeat(32)) },
                { "right": format!("0x{}", "01".repeat(32)) },
            ])
        );

        let got: Proof = serde_json::from_value(json).expect("serialized proof is correct");
        assert_eq!(got, proof);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_proof_serde_postcard() {
        let (a, b, _) = two_leaf_setup();
        let proof = Proof::new(vec![ProofStep::Right(b), ProofStep::Left(a)]);

        let serialized = postcard::to_allocvec(&proof).expect("Serialization to vec must succeed");
        let got: Proof = postcard::from_bytes(&serialized).expect("serialized proof is correct");

        assert_eq!(got, proof);
    }
}
