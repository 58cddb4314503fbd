//! Time-indexed jump genome
//!
//! A genome is a fixed-length list of values in `[0, 1]`. Slot `i` governs
//! the runner's pace and jump decisions during frames
//! `[i * gene_duration, (i + 1) * gene_duration)`; the last slot stays active
//! once the runner outlives the genome.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum perturbation applied to a mutated gene
pub const MUTATION_POWER: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<f32>,
}

impl Genome {
    /// Uniformly random genome of `len` slots
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self {
            genes: (0..len).map(|_| rng.random::<f32>()).collect(),
        }
    }

    /// Genome with every slot set to `value` (clamped into `[0, 1]`)
    pub fn constant(len: usize, value: f32) -> Self {
        Self {
            genes: vec![value.clamp(0.0, 1.0); len],
        }
    }

    /// Build from raw values, clamping each into `[0, 1]`
    pub fn from_genes(genes: Vec<f32>) -> Self {
        Self {
            genes: genes.into_iter().map(|g| g.clamp(0.0, 1.0)).collect(),
        }
    }

    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Value of slot `index`, saturating at the last slot
    pub fn gene(&self, index: usize) -> f32 {
        match self.genes.len() {
            0 => 0.0,
            len => self.genes[index.min(len - 1)],
        }
    }

    /// Perturb each gene with probability `rate`, keeping values in `[0, 1]`
    ///
    /// Returns the number of genes touched.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, rng: &mut R) -> usize {
        let mut mutated = 0;
        for gene in self.genes.iter_mut() {
            if rng.random::<f32>() < rate {
                *gene = (*gene + rng.random_range(-MUTATION_POWER..=MUTATION_POWER)).clamp(0.0, 1.0);
                mutated += 1;
            }
        }
        mutated
    }
}

/// Single-point crossover
///
/// The child takes `a` before the cut and `b` from the cut onward; the cut
/// is uniform in `[0, len)`.
pub fn crossover<R: Rng + ?Sized>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
    let len = a.len().min(b.len());
    if len == 0 {
        return Genome { genes: Vec::new() };
    }
    let cut = rng.random_range(0..len);
    crossover_at(a, b, cut)
}

/// Crossover with an explicit cut index
pub fn crossover_at(a: &Genome, b: &Genome, cut: usize) -> Genome {
    let len = a.len().min(b.len());
    let cut = cut.min(len);
    let mut genes = Vec::with_capacity(len);
    genes.extend_from_slice(&a.genes[..cut]);
    genes.extend_from_slice(&b.genes[cut..len]);
    Genome { genes }
}
