use thiserror::Error;

/// Failures surfaced by tree construction, proof generation and proof
/// verification. All are local to the failing call and deterministic;
/// none succeed on retry.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum MerkleTreeError {
    /// Construction was attempted with zero items. An empty dataset has
    /// no well-defined root.
    #[error("cannot build a Merkle tree from an empty item sequence")]
    EmptyInput,

    /// A proof was requested for a leaf index outside `[0, leaf_count)`.
    #[error("leaf index {index} is out of range for a tree with {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    /// The hash algorithm name given at construction is not provided by
    /// this crate.
    #[error("unsupported hash algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// A proof step is structurally invalid, e.g. a sibling digest whose
    /// length does not match the proof's hash algorithm. Mismatched
    /// content is never reported through this variant; verification of
    /// wrong data returns `Ok(false)`.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}
