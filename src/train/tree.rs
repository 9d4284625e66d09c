//! Least-squares regression tree

use serde::{Deserialize, Serialize};

/// Stopping rules for tree growth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// Binary tree minimising squared error, stored as a flat node arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit on the rows of `x` selected by `indices` against `y`
    pub fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize], params: TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, indices.to_vec(), 0, params);
        tree
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: TreeParams,
    ) -> usize {
        let id = self.nodes.len();
        let value = mean(indices.iter().map(|&i| y[i]));
        self.nodes.push(Node::Leaf { value });

        if depth >= params.max_depth || indices.len() < params.min_samples_split.max(2) {
            return id;
        }
        let Some(split) = best_split(x, y, &indices) else {
            return id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| x[i][split.feature] <= split.threshold);
        let left = self.grow(x, y, left_idx, depth + 1, params);
        let right = self.grow(x, y, right_idx, depth + 1, params);
        self.nodes[id] = Node::Split { feature: split.feature, threshold: split.threshold, left, right };
        id
    }

    /// Predict a single row
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split { feature, threshold, left, right }) => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }
}

/// Split with the largest reduction in squared error, if any reduces it
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let n_features = x.get(indices[0]).map_or(0, Vec::len);
    let mut best: Option<BestSplit> = None;

    let mut order = indices.to_vec();
    for feature in 0..n_features {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for (pos, pair) in order.windows(2).enumerate() {
            left_sum += y[pair[0]];
            let (lo, hi) = (x[pair[0]][feature], x[pair[1]][feature]);
            if lo == hi {
                continue;
            }
            let n_left = (pos + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            // SSE reduction up to a constant: Σl²/nl + Σr²/nr − Σ²/n
            let gain = left_sum * left_sum / n_left + right_sum * right_sum / n_right
                - total * total / n;
            if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain) {
                best = Some(BestSplit { feature, threshold: lo + (hi - lo) / 2.0, gain });
            }
        }
    }
    best
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PARAMS: TreeParams = TreeParams { max_depth: 3, min_samples_split: 2 };

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
        let idx: Vec<usize> = (0..20).collect();

        let tree = RegressionTree::fit(&x, &y, &idx, PARAMS);
        assert_relative_eq!(tree.predict_row(&[3.0]), 1.0);
        assert_relative_eq!(tree.predict_row(&[15.0]), 5.0);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn test_constant_feature_gives_single_leaf() {
        let x = vec![vec![1.0]; 6];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tree = RegressionTree::fit(&x, &y, &(0..6).collect::<Vec<_>>(), PARAMS);
        assert_eq!(tree.n_leaves(), 1);
        assert_relative_eq!(tree.predict_row(&[1.0]), 3.5);
    }

    #[test]
    fn test_depth_limits_leaves() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<f64> = (0..64).map(f64::from).collect();
        let tree = RegressionTree::fit(&x, &y, &(0..64).collect::<Vec<_>>(), PARAMS);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn test_min_samples_split() {
        let x: Vec<Vec<f64>> = (0..4).map(|i| vec![f64::from(i)]).collect();
        let y = vec![0.0, 0.0, 1.0, 1.0];
        let params = TreeParams { max_depth: 3, min_samples_split: 5 };
        let tree = RegressionTree::fit(&x, &y, &(0..4).collect::<Vec<_>>(), params);
        assert_eq!(tree.n_leaves(), 1);
    }
}
