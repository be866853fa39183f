use crate::prelude::{DetectError, DetectResult};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Unsupervised scorer over row-major feature matrices.
pub trait OutlierModel {
    fn fit(&mut self, samples: ArrayView2<f64>) -> DetectResult<()>;

    /// Raw scores, lower meaning more anomalous.
    fn score_samples(&self, samples: ArrayView2<f64>) -> DetectResult<Array1<f64>>;
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Random partitioning tree stored as a flat node arena.
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(samples: ArrayView2<f64>, rows: &[usize], height_limit: usize, rng: &mut StdRng) -> Self {
        let mut nodes = Vec::new();
        Self::grow_node(&mut nodes, samples, rows, 0, height_limit, rng);
        Self { nodes }
    }

    fn grow_node(
        nodes: &mut Vec<Node>,
        samples: ArrayView2<f64>,
        rows: &[usize],
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let idx = nodes.len();
        nodes.push(Node::Leaf { size: rows.len() });
        if depth >= height_limit || rows.len() <= 1 {
            return idx;
        }

        let spread: Vec<(usize, f64, f64)> = (0..samples.ncols())
            .filter_map(|feature| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &row| {
                    let value = samples[[row, feature]];
                    (lo.min(value), hi.max(value))
                });
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();
        if spread.is_empty() {
            return idx;
        }

        let (feature, lo, hi) = spread[rng.gen_range(0..spread.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&row| samples[[row, feature]] < threshold);

        let left = Self::grow_node(nodes, samples, &left_rows, depth + 1, height_limit, rng);
        let right = Self::grow_node(nodes, samples, &right_rows, depth + 1, height_limit, rng);
        nodes[idx] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        idx
    }

    fn path_length(&self, sample: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Isolation forest with a fixed seed, so identical input gives identical scores.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_trees: usize,
    sample_size: usize,
    seed: u64,
    trees: Vec<IsolationTree>,
    fitted_sample_size: usize,
}

impl IsolationForest {
    pub fn new(n_trees: usize, sample_size: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            sample_size: sample_size.max(2),
            seed,
            trees: Vec::new(),
            fitted_sample_size: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl OutlierModel for IsolationForest {
    fn fit(&mut self, samples: ArrayView2<f64>) -> DetectResult<()> {
        let rows = samples.nrows();
        if rows < 2 {
            return Err(DetectError::InvalidInput(format!(
                "isolation forest needs at least 2 samples, got {}",
                rows
            )));
        }
        if samples.iter().any(|value| !value.is_finite()) {
            return Err(DetectError::InvalidInput(
                "feature matrix contains non-finite values".into(),
            ));
        }

        let sample_size = self.sample_size.min(rows);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_trees)
            .map(|_| {
                let subset = index::sample(&mut rng, rows, sample_size).into_vec();
                IsolationTree::grow(samples, &subset, height_limit, &mut rng)
            })
            .collect();
        self.fitted_sample_size = sample_size;
        Ok(())
    }

    fn score_samples(&self, samples: ArrayView2<f64>) -> DetectResult<Array1<f64>> {
        if !self.is_fitted() {
            return Err(DetectError::Internal("isolation forest is not fitted".into()));
        }
        let normalizer = average_path_length(self.fitted_sample_size);
        let scores = samples
            .rows()
            .into_iter()
            .map(|sample| {
                let mean_path = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(sample))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                -(2f64).powf(-mean_path / normalizer)
            })
            .collect::<Vec<_>>();
        Ok(Array1::from(scores))
    }
}
