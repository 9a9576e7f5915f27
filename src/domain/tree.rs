use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

use super::hash::{Digest, HashAlgorithm};
use super::proof::{LeafProof, MerkleProof, Orientation, ProofStep};
use crate::error::MerkleTreeError;

/// Construction options. One recognized key: the hash algorithm name
/// ("sha256" by default, "sha512" also provided).
#[derive(Debug, Clone, Default)]
pub struct MerkleTreeOptions {
    pub hash_algorithm: Option<String>,
}

/// An immutable binary Merkle tree stored as an ordered list of levels,
/// leaves first, root level last.
///
/// Each level above the leaves pairs adjacent digests left to right;
/// the unpaired tail of an odd-length level is hashed with itself
/// (`hash(x || x)`). Consumers that need bit-exact roots across
/// implementations must replicate exactly that duplication rule.
///
/// Once built the tree is read-only, so a shared reference can serve
/// concurrent proof and accessor calls without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>, // levels[0] = leaves, last level = [root]
    algorithm: HashAlgorithm,
}

impl MerkleTree {
    /// Build a tree over `items` with the default algorithm (SHA-256).
    pub fn from_items<T: AsRef<[u8]> + Sync>(items: &[T]) -> Result<Self, MerkleTreeError> {
        Self::from_items_with_options(items, &MerkleTreeOptions::default())
    }

    /// Build a tree over `items`, resolving the algorithm from `options`.
    pub fn from_items_with_options<T: AsRef<[u8]> + Sync>(
        items: &[T],
        options: &MerkleTreeOptions,
    ) -> Result<Self, MerkleTreeError> {
        let algorithm = match options.hash_algorithm.as_deref() {
            Some(name) => HashAlgorithm::from_name(name)?,
            None => HashAlgorithm::default(),
        };
        let leaves: Vec<Digest> = items
            .par_iter()
            .map(|item| algorithm.hash(item.as_ref()))
            .collect();
        Self::from_leaf_digests(leaves, algorithm)
    }

    /// Build a tree from already-hashed leaves.
    pub fn from_leaf_digests(
        leaves: Vec<Digest>,
        algorithm: HashAlgorithm,
    ) -> Result<Self, MerkleTreeError> {
        let total_start = Instant::now();
        if leaves.is_empty() {
            return Err(MerkleTreeError::EmptyInput);
        }

        let mut levels = vec![leaves];
        let build_start = Instant::now();
        while levels[levels.len() - 1].len() > 1 {
            let next: Vec<Digest> = levels[levels.len() - 1]
                .par_chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    // Unpaired tail of an odd-length level: duplicated
                    // as its own sibling.
                    let right = pair.get(1).unwrap_or(left);
                    algorithm.hash_nodes(left, right)
                })
                .collect();
            levels.push(next);
        }
        debug!(
            "Building {} levels over {} leaves took {:?}",
            levels.len(),
            levels[0].len(),
            build_start.elapsed()
        );

        info!(
            "Total duration of from_leaf_digests: {:?}",
            total_start.elapsed()
        );
        Ok(Self { levels, algorithm })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The root digest. Always present: construction rejects empty input.
    pub fn get_root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0].clone()
    }

    /// Number of levels minus one; 0 for a single-leaf tree.
    pub fn get_depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn get_leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// An independent copy of the leaf digests, in input order.
    pub fn get_leaves(&self) -> Vec<Digest> {
        self.levels[0].clone()
    }

    /// An independent copy of every level, leaves first. Mutating the
    /// returned structure cannot touch the tree's own storage.
    pub fn get_levels(&self) -> Vec<Vec<Digest>> {
        self.levels.clone()
    }

    /// Generate the inclusion proof for the leaf at `index`: one sibling
    /// step per level below the root, bottom-up.
    ///
    /// When the leaf's path crosses the unpaired tail of an odd-length
    /// level, the step carries the node's own digest (orientation
    /// `Right`), mirroring the builder's self-duplication, so the
    /// verifier reconstructs `hash(x || x)` from the steps alone.
    pub fn get_proof(&self, index: usize) -> Result<MerkleProof, MerkleTreeError> {
        let leaf_count = self.get_leaf_count();
        if index >= leaf_count {
            return Err(MerkleTreeError::IndexOutOfRange { index, leaf_count });
        }

        let mut steps = Vec::with_capacity(self.get_depth());
        let mut node = index;

        // Walk every level below the root.
        for level in &self.levels[..self.levels.len() - 1] {
            // An even index is a left child, so its sibling sits to the
            // right; an odd index mirrors that.
            let (sibling_index, orientation) = if node % 2 == 0 {
                (node + 1, Orientation::Right)
            } else {
                (node - 1, Orientation::Left)
            };
            let sibling = match level.get(sibling_index) {
                Some(digest) => digest.clone(),
                None => level[node].clone(), // unpaired tail duplicates itself
            };
            steps.push(ProofStep {
                sibling,
                orientation,
            });
            node /= 2;
        }

        Ok(MerkleProof::new(steps, self.algorithm))
    }

    /// Generate proofs for every leaf, ordered by index. Proofs share no
    /// mutable state, so the batch is computed in parallel.
    pub fn get_all_proofs(&self) -> Result<Vec<LeafProof>, MerkleTreeError> {
        (0..self.get_leaf_count())
            .into_par_iter()
            .map(|index| {
                Ok(LeafProof {
                    index,
                    leaf_digest: self.levels[0][index].clone(),
                    proof: self.get_proof(index)?,
                })
            })
            .collect()
    }

    /// Round-trip convenience: prove the leaf at `index` and verify
    /// `data` against this tree's own root.
    pub fn verify_item(&self, index: usize, data: &[u8]) -> Result<bool, MerkleTreeError> {
        self.get_proof(index)?.verify(data, &self.get_root())
    }
}
