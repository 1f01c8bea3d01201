//! Merkle tree over every transaction the ledger has recorded.
//!
//! Leaves are hex digests of transaction text. Interior nodes hash the
//! concatenation of two hex strings. A node left without a partner at the end
//! of an odd-sized level is rehashed on its own rather than paired with a copy
//! of itself, so roots differ from the "duplicate last leaf" convention.

use serde::Serialize;
use tracing::debug;

use crate::hash::sha256_hex;

#[derive(Clone, Debug, Default, Serialize)]
pub struct MerkleTree {
    leaves: Vec<String>,
    levels: Vec<Vec<String>>,
}

/// One step of an inclusion path, from leaf towards root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofStep {
    /// Sibling sits to the left: parent = H(sibling ‖ current).
    Left(String),
    /// Sibling sits to the right: parent = H(current ‖ sibling).
    Right(String),
    /// No sibling at this level: parent = H(current).
    Lone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub index: usize,
    pub leaf: String,
    pub steps: Vec<ProofStep>,
}

impl MerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from transaction texts in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let leaves = texts
            .into_iter()
            .map(|t| sha256_hex(t.as_ref()))
            .collect();
        let mut tree = Self {
            leaves,
            levels: Vec::new(),
        };
        tree.rebuild();
        tree
    }

    /// Hashes `transaction_text` into a new leaf and rebuilds every level.
    pub fn add_leaf(&mut self, transaction_text: &str) {
        self.leaves.push(sha256_hex(transaction_text));
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.levels.clear();
        if self.leaves.is_empty() {
            return;
        }
        self.levels.push(self.leaves.clone());

        while let Some(current) = self.levels.last().filter(|l| l.len() > 1) {
            let next: Vec<String> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => sha256_hex(format!("{left}{right}")),
                    [lone] => sha256_hex(lone),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            self.levels.push(next);
        }

        debug!(
            leaves = self.leaves.len(),
            depth = self.levels.len(),
            "merkle tree rebuilt"
        );
    }

    pub fn root(&self) -> Option<&str> {
        self.levels
            .last()
            .and_then(|top| top.first())
            .map(String::as_str)
    }

    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    pub fn leaves(&self) -> &[String] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Inclusion path for the leaf at `index`, or `None` if out of range.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let leaf = self.leaves.get(index)?.clone();
        let mut steps = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let step = if idx % 2 == 1 {
                ProofStep::Left(level[idx - 1].clone())
            } else {
                match level.get(idx + 1) {
                    Some(sibling) => ProofStep::Right(sibling.clone()),
                    None => ProofStep::Lone,
                }
            };
            steps.push(step);
            idx /= 2;
        }

        Some(MerkleProof { index, leaf, steps })
    }
}

/// Recomputes the root from `proof` and compares it with `root`.
pub fn verify_proof(root: &str, proof: &MerkleProof) -> bool {
    let computed = proof
        .steps
        .iter()
        .fold(proof.leaf.clone(), |current, step| match step {
            ProofStep::Left(sibling) => sha256_hex(format!("{sibling}{current}")),
            ProofStep::Right(sibling) => sha256_hex(format!("{current}{sibling}")),
            ProofStep::Lone => sha256_hex(&current),
        });
    computed == root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_no_root() {
        let tree = MerkleTree::new();
        assert!(tree.root().is_none());
        assert!(tree.levels().is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn single_leaf_is_root() {
        let mut tree = MerkleTree::new();
        tree.add_leaf("a");
        assert_eq!(tree.levels().len(), 1);
        assert_eq!(tree.root(), Some(sha256_hex("a").as_str()));
    }

    #[test]
    fn two_leaves_hash_concatenated_hex() {
        let mut tree = MerkleTree::new();
        tree.add_leaf("a");
        tree.add_leaf("b");
        let (ha, hb) = (sha256_hex("a"), sha256_hex("b"));
        let expected = sha256_hex(format!("{ha}{hb}"));
        assert_eq!(tree.root(), Some(expected.as_str()));
        assert_eq!(tree.levels(), &[vec![ha, hb], vec![expected]]);
    }

    #[test]
    fn odd_leaf_is_rehashed_alone() {
        let tree = MerkleTree::from_texts(["a", "b", "c"]);
        let (ha, hb, hc) = (sha256_hex("a"), sha256_hex("b"), sha256_hex("c"));
        let ab = sha256_hex(format!("{ha}{hb}"));
        let c = sha256_hex(&hc);
        let root = sha256_hex(format!("{ab}{c}"));

        assert_eq!(tree.levels()[1], vec![ab, c.clone()]);
        assert_eq!(tree.root(), Some(root.as_str()));

        // not the duplicate-and-pair convention
        let dup = sha256_hex(format!("{hc}{hc}"));
        assert_ne!(c, dup);
    }

    #[test]
    fn level_sizes_halve_rounding_up() {
        let tree = MerkleTree::from_texts((0..5).map(|i| format!("tx{i}")));
        let sizes: Vec<usize> = tree.levels().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
    }

    #[test]
    fn incremental_and_batch_roots_match() {
        let texts: Vec<String> = (0..7).map(|i| format!("tx{i}")).collect();
        let mut inc = MerkleTree::new();
        for t in &texts {
            inc.add_leaf(t);
        }
        let batch = MerkleTree::from_texts(&texts);
        assert_eq!(inc.root(), batch.root());
        assert_eq!(inc.levels(), batch.levels());
    }

    #[test]
    fn appending_changes_root() {
        let mut tree = MerkleTree::from_texts(["a", "b"]);
        let before = tree.root().map(str::to_owned);
        tree.add_leaf("c");
        assert_ne!(before.as_deref(), tree.root());
    }

    #[test]
    fn proofs_verify_for_every_leaf() {
        for n in 1..=9 {
            let tree = MerkleTree::from_texts((0..n).map(|i| format!("tx{i}")));
            let root = tree.root().unwrap();
            for i in 0..n {
                let proof = tree.proof(i).unwrap();
                assert!(verify_proof(root, &proof), "n={n} i={i}");
            }
            assert!(tree.proof(n).is_none());
        }
    }

    #[test]
    fn tampered_proof_fails() {
        let tree = MerkleTree::from_texts(["a", "b", "c"]);
        let root = tree.root().unwrap();
        let mut proof = tree.proof(2).unwrap();
        assert_eq!(proof.steps[0], ProofStep::Lone);
        proof.leaf = sha256_hex("z");
        assert!(!verify_proof(root, &proof));
    }
}
