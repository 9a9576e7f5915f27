use serde::{Deserialize, Serialize};

use super::hash::{Digest, HashAlgorithm};
use crate::error::MerkleTreeError;

/// Which side of the running digest a sibling occupies during root
/// reconstruction. `Left` means the sibling is concatenated before the
/// running digest, `Right` after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    Right,
}

/// One level of an inclusion proof: a sibling digest and its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: Digest,
    pub orientation: Orientation,
}

/// An inclusion proof: sibling steps in bottom-up order, plus the
/// algorithm the tree hashed with so a standalone verifier digests the
/// leaf data the same way. Serializable; proofs may arrive through
/// untrusted channels and are structurally re-checked at verify time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    steps: Vec<ProofStep>,
    algorithm: HashAlgorithm,
}

impl MerkleProof {
    pub fn new(steps: Vec<ProofStep>, algorithm: HashAlgorithm) -> Self {
        Self { steps, algorithm }
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The sibling digests only, bottom-up.
    pub fn proof_hashes(&self) -> Vec<Digest> {
        self.steps.iter().map(|step| step.sibling.clone()).collect()
    }

    /// Compute the root implied by `leaf_digest` by folding over the steps.
    pub fn root_from(&self, leaf_digest: &Digest) -> Digest {
        let mut current = leaf_digest.clone();
        for step in &self.steps {
            current = match step.orientation {
                Orientation::Left => self.algorithm.hash_nodes(&step.sibling, &current),
                Orientation::Right => self.algorithm.hash_nodes(&current, &step.sibling),
            };
        }
        current
    }

    /// Verify the original item `data` against `expected_root`.
    ///
    /// Tampered or wrong data is the expected negative case and returns
    /// `Ok(false)`; the final root comparison is constant-time. Only a
    /// structurally invalid proof (wrong-size sibling digest) is an error.
    pub fn verify(&self, data: &[u8], expected_root: &Digest) -> Result<bool, MerkleTreeError> {
        self.verify_digest(&self.algorithm.hash(data), expected_root)
    }

    /// Verify an already-hashed leaf digest against `expected_root`.
    pub fn verify_digest(
        &self,
        leaf_digest: &Digest,
        expected_root: &Digest,
    ) -> Result<bool, MerkleTreeError> {
        self.check_shape()?;
        Ok(self.root_from(leaf_digest).ct_eq(expected_root))
    }

    fn check_shape(&self) -> Result<(), MerkleTreeError> {
        let want = self.algorithm.digest_len();
        for (i, step) in self.steps.iter().enumerate() {
            if step.sibling.len() != want {
                return Err(MerkleTreeError::MalformedProof(format!(
                    "step {i} carries a {}-byte sibling digest, expected {want} for {}",
                    step.sibling.len(),
                    self.algorithm,
                )));
            }
        }
        Ok(())
    }
}

/// One entry of a batch proof: a leaf position with its digest and proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafProof {
    pub index: usize,
    pub leaf_digest: Digest,
    pub proof: MerkleProof,
}

#[cfg(test)]
mod tests {
    use super::{MerkleProof, Orientation, ProofStep};
    use crate::domain::hash::{Digest, HashAlgorithm};
    use crate::error::MerkleTreeError;

    const ALG: HashAlgorithm = HashAlgorithm::Sha256;

    #[test]
    fn test_no_steps_proof() {
        // With no siblings the leaf digest must be the root itself.
        let proof = MerkleProof::new(vec![], ALG);
        let leaf = b"single_leaf";
        let leaf_digest = ALG.hash(leaf);

        assert!(proof.verify(leaf, &leaf_digest).unwrap());

        let other_root = ALG.hash(b"some_other_data");
        assert!(
            !proof.verify(leaf, &other_root).unwrap(),
            "No-step proof must succeed only when leaf digest == root"
        );
    }

    #[test]
    fn test_single_step_left() {
        // Left sibling => root = hash(sibling || leaf)
        let leaf = b"leaf_data";
        let leaf_digest = ALG.hash(leaf);
        let sibling = ALG.hash(b"sibling_data");

        let proof = MerkleProof::new(
            vec![ProofStep {
                sibling: sibling.clone(),
                orientation: Orientation::Left,
            }],
            ALG,
        );

        let correct_root = ALG.hash_nodes(&sibling, &leaf_digest);
        assert!(proof.verify(leaf, &correct_root).unwrap());

        let swapped_root = ALG.hash_nodes(&leaf_digest, &sibling);
        assert!(
            !proof.verify(leaf, &swapped_root).unwrap(),
            "Swapping the concatenation order must fail"
        );
    }

    #[test]
    fn test_single_step_right() {
        // Right sibling => root = hash(leaf || sibling)
        let leaf = b"left_leaf";
        let leaf_digest = ALG.hash(leaf);
        let sibling = ALG.hash(b"right_leaf");

        let proof = MerkleProof::new(
            vec![ProofStep {
                sibling: sibling.clone(),
                orientation: Orientation::Right,
            }],
            ALG,
        );

        let correct_root = ALG.hash_nodes(&leaf_digest, &sibling);
        assert!(proof.verify(leaf, &correct_root).unwrap());

        let swapped_root = ALG.hash_nodes(&sibling, &leaf_digest);
        assert!(!proof.verify(leaf, &swapped_root).unwrap());
    }

    #[test]
    fn test_multi_step_proof() {
        // Hand-built structure:
        //         R
        //       /   \
        //     N1     N2
        //    /  \   /  \
        //   A    B C    D
        let a = ALG.hash(b"A");
        let b = ALG.hash(b"B");
        let c = ALG.hash(b"C");
        let d = ALG.hash(b"D");

        let n1 = ALG.hash_nodes(&a, &b);
        let n2 = ALG.hash_nodes(&c, &d);
        let r = ALG.hash_nodes(&n1, &n2);

        // Proof for leaf B: A sits to its left, then N2 to the right.
        let proof = MerkleProof::new(
            vec![
                ProofStep {
                    sibling: a,
                    orientation: Orientation::Left,
                },
                ProofStep {
                    sibling: n2,
                    orientation: Orientation::Right,
                },
            ],
            ALG,
        );

        assert!(proof.verify(b"B", &r).unwrap());
        assert_eq!(proof.root_from(&b), r);
        assert_eq!(proof.proof_hashes().len(), 2);

        let fake_root = ALG.hash(b"fake_root");
        assert!(!proof.verify(b"B", &fake_root).unwrap());
    }

    #[test]
    fn test_flipped_orientation_fails() {
        let leaf = b"victim_leaf";
        let leaf_digest = ALG.hash(leaf);
        let sibling = ALG.hash(b"sibling_data");

        // Real layout is (leaf, sibling); the malicious proof claims the
        // sibling sits on the left.
        let malicious = MerkleProof::new(
            vec![ProofStep {
                sibling: sibling.clone(),
                orientation: Orientation::Left,
            }],
            ALG,
        );
        let correct_root = ALG.hash_nodes(&leaf_digest, &sibling);

        assert!(!malicious.verify(leaf, &correct_root).unwrap());
    }

    #[test]
    fn test_wrong_size_sibling_is_malformed() {
        let sibling = Digest::from_bytes(vec![0u8; 16]);
        let proof = MerkleProof::new(
            vec![ProofStep {
                sibling,
                orientation: Orientation::Right,
            }],
            ALG,
        );

        let root = ALG.hash(b"whatever");
        let result = proof.verify(b"data", &root);
        assert!(
            matches!(result, Err(MerkleTreeError::MalformedProof(_))),
            "A 16-byte sibling under sha256 must be rejected before folding"
        );
    }

    #[test]
    fn test_orientation_serializes_as_lowercase_tags() {
        let json = serde_json::to_string(&Orientation::Left).unwrap();
        assert_eq!(json, "\"left\"");
        let back: Orientation = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(back, Orientation::Right);

        // An out-of-vocabulary tag never reaches the verifier.
        assert!(serde_json::from_str::<Orientation>("\"up\"").is_err());
    }

    #[test]
    fn test_proof_json_round_trip() {
        let sibling = ALG.hash(b"sibling");
        let leaf = b"leaf";
        let leaf_digest = ALG.hash(leaf);
        let root = ALG.hash_nodes(&leaf_digest, &sibling);

        let proof = MerkleProof::new(
            vec![ProofStep {
                sibling,
                orientation: Orientation::Right,
            }],
            ALG,
        );

        let json = serde_json::to_string(&proof).unwrap();
        let decoded: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, proof);
        assert!(decoded.verify(leaf, &root).unwrap());
    }
}
