//! Sample partitioning for leak-resistant stack training.
//!
//! A stack in partitioned mode receives one disjoint index set per layer,
//! either from a [`Splitter`] (its test groups) or from explicit index lists.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use crate::error::{Result, StackError};

/// A (train indices, test indices) pair.
pub type Split = (Vec<usize>, Vec<usize>);

/// Something that partitions `n_samples` rows into train/test splits.
pub trait Splitter {
    fn n_splits(&self) -> usize;

    /// Produce `n_splits()` train/test pairs whose test groups are disjoint.
    fn split(&self, n_samples: usize) -> Result<Vec<Split>>;

    /// An equivalent splitter configured for `n_splits` splits.
    fn with_n_splits(&self, n_splits: usize) -> Box<dyn Splitter>;

    fn boxed_clone(&self) -> Box<dyn Splitter> {
        self.with_n_splits(self.n_splits())
    }

    fn name(&self) -> &str {
        "splitter"
    }
}

/// K-fold splitter: contiguous test groups, the first `n % k` one sample larger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    /// Seed for shuffling; the thread RNG is used when `None`.
    pub seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn shuffled(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    fn ordering(&self, n_samples: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            match self.seed {
                Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => indices.shuffle(&mut thread_rng()),
            }
        }
        indices
    }
}

impl Splitter for KFold {
    fn n_splits(&self) -> usize {
        self.n_splits
    }

    fn split(&self, n_samples: usize) -> Result<Vec<Split>> {
        if self.n_splits == 0 {
            return Err(StackError::config("KFold requires at least one split"));
        }
        if n_samples < self.n_splits {
            return Err(StackError::config(format!(
                "Cannot have number of splits {} greater than the number of samples {}",
                self.n_splits, n_samples
            )));
        }

        let indices = self.ordering(n_samples);
        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < remainder);
            let test = indices[start..start + size].to_vec();
            let train = indices[..start]
                .iter()
                .chain(indices[start + size..].iter())
                .copied()
                .collect();
            log::trace!(
                "Preparing fold {} with {} training samples and {} testing samples",
                fold,
                n_samples - size,
                size
            );
            splits.push((train, test));
            start += size;
        }
        Ok(splits)
    }

    fn with_n_splits(&self, n_splits: usize) -> Box<dyn Splitter> {
        Box::new(KFold {
            n_splits,
            ..self.clone()
        })
    }

    fn name(&self) -> &str {
        "KFold"
    }
}

/// Fold policy of a partitioned stack.
pub enum Folds {
    Splitter(Box<dyn Splitter>),
    Explicit(Vec<Vec<usize>>),
}

impl Folds {
    pub fn n_folds(&self) -> usize {
        match self {
            Folds::Splitter(splitter) => splitter.n_splits(),
            Folds::Explicit(folds) => folds.len(),
        }
    }

    /// One index set per layer for a dataset of `n_samples` rows.
    pub fn partitions(&self, n_samples: usize) -> Result<Vec<Vec<usize>>> {
        match self {
            Folds::Splitter(splitter) => Ok(splitter
                .split(n_samples)?
                .into_iter()
                .map(|(_, test)| test)
                .collect()),
            Folds::Explicit(folds) => Ok(folds.clone()),
        }
    }
}

impl Clone for Folds {
    fn clone(&self) -> Self {
        match self {
            Folds::Splitter(splitter) => Folds::Splitter(splitter.boxed_clone()),
            Folds::Explicit(folds) => Folds::Explicit(folds.clone()),
        }
    }
}

impl fmt::Debug for Folds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Folds::Splitter(splitter) => f
                .debug_struct("Splitter")
                .field("name", &splitter.name())
                .field("n_splits", &splitter.n_splits())
                .finish(),
            Folds::Explicit(folds) => f.debug_tuple("Explicit").field(folds).finish(),
        }
    }
}

/// Check that partitions are in range and pairwise disjoint.
///
/// Returns the sorted union of all partitions, i.e. the rows that take part in
/// partitioned training.
pub fn covered_rows(partitions: &[Vec<usize>], n_samples: usize) -> Result<Vec<usize>> {
    let mut owner: Vec<Option<usize>> = vec![None; n_samples];
    for (fold, indices) in partitions.iter().enumerate() {
        for &idx in indices {
            if idx >= n_samples {
                return Err(StackError::config(format!(
                    "Fold {} contains index {} but there are only {} samples",
                    fold, idx, n_samples
                )));
            }
            if let Some(previous) = owner[idx] {
                return Err(StackError::config(format!(
                    "Index {} appears in fold {} and fold {}, folds must be disjoint",
                    idx, previous, fold
                )));
            }
            owner[idx] = Some(fold);
        }
    }
    Ok(owner
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.map(|_| i))
        .collect())
}
