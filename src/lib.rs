#![deny(clippy::all)]

//! Binary Merkle tree engine: deterministic construction over an ordered
//! item sequence, compact inclusion proofs, and constant-time proof
//! verification against a root digest.

mod domain;
mod error;

pub use domain::hash::{Digest, HashAlgorithm};
pub use domain::proof::{LeafProof, MerkleProof, Orientation, ProofStep};
pub use domain::tree::{MerkleTree, MerkleTreeOptions};
pub use error::MerkleTreeError;
