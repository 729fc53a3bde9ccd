//! L2-regularized logistic regression fit by batch gradient descent.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-column z-score statistics, learned on the training split only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Standardizer {
    pub fn fit(x: &Array2<f64>) -> Self {
        let cols = x.ncols();
        let means = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        let stds = if x.nrows() == 0 {
            Array1::ones(cols)
        } else {
            // A constant column would divide by zero; leave it centred only
            x.std_axis(Axis(0), 0.0)
                .mapv(|s| if s > f64::EPSILON { s } else { 1.0 })
        };
        Self {
            means: means.to_vec(),
            stds: stds.to_vec(),
        }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let means = Array1::from(self.means.clone());
        let stds = Array1::from(self.stds.clone());
        (x - &means) / &stds
    }

    pub fn transform_row(&self, row: &[f64]) -> Array1<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// Gradient-descent settings.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Stop when the loss improves by less than this.
    pub tolerance: f64,
    /// L2 penalty on the weights (not the bias).
    pub l2: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            tolerance: 1e-7,
            l2: 1e-3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn log_loss(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    let eps = 1e-15;
    let n = y.len().max(1) as f64;
    -y.iter()
        .zip(p.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / n
}

impl LogisticRegression {
    /// Fit on already-standardized features and 0/1 labels.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: FitParams) -> Self {
        let n = x.nrows().max(1) as f64;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut previous_loss = f64::INFINITY;

        for iter in 0..params.max_iter {
            let predictions = (x.dot(&weights) + bias).mapv(sigmoid);
            let errors = &predictions - y;

            let grad_w = x.t().dot(&errors) / n + &weights * params.l2;
            let grad_b = errors.sum() / n;

            weights = weights - grad_w * params.learning_rate;
            bias -= params.learning_rate * grad_b;

            let loss = log_loss(y, &predictions);
            if (previous_loss - loss).abs() < params.tolerance {
                debug!("Logistic regression converged at iteration {} (loss {:.6})", iter, loss);
                break;
            }
            previous_loss = loss;
        }

        Self {
            weights: weights.to_vec(),
            bias,
        }
    }

    /// Probability of class 1 for one standardized row.
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> f64 {
        let z: f64 = row
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_proba_row(row))
            .collect()
    }

    /// Hard 0/1 predictions at the 0.5 cut.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        self.predict_proba(x)
            .mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 })
    }
}

/// Share of predictions equal to the labels; 0 for an empty set.
pub fn accuracy(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let hits = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    hits as f64 / actual.len() as f64
}
