//! Classical optimizers for the variational loop.
//!
//! [`Bfgs`] is a quasi-Newton local search with central-difference
//! gradients and a backtracking Armijo line search. Running out of
//! iterations is not an error: the best point found is returned with
//! `converged = false`.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// History of objective values, one per accepted iterate.
    pub history: Vec<f64>,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// Trait for classical optimizers.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;
}

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;

/// Step halvings tried before the line search gives up.
const MAX_BACKTRACKS: usize = 50;

/// BFGS optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bfgs {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Converge once the largest gradient component drops below this.
    pub gtol: f64,
    /// Converge once the relative objective improvement drops below this.
    pub ftol: f64,
    /// Finite-difference step for the numerical gradient.
    pub step: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            maxiter: 200,
            gtol: 1e-6,
            ftol: 1e-12,
            step: 1e-6,
        }
    }
}

impl Bfgs {
    /// Create a new BFGS optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set the relative objective tolerance.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Set the finite-difference step.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }
}

/// Objective wrapper that counts evaluations.
struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F: FnMut(&[f64]) -> f64> Counted<F> {
    fn eval(&mut self, x: &Array1<f64>) -> f64 {
        self.evaluations += 1;
        match x.as_slice() {
            Some(slice) => (self.f)(slice),
            None => (self.f)(&x.to_vec()),
        }
    }

    /// Central-difference gradient.
    fn gradient(&mut self, x: &Array1<f64>, h: f64) -> Array1<f64> {
        let mut shifted = x.clone();
        let mut grad = Array1::zeros(x.len());
        for k in 0..x.len() {
            let xk = x[k];
            shifted[k] = xk + h;
            let forward = self.eval(&shifted);
            shifted[k] = xk - h;
            let backward = self.eval(&shifted);
            shifted[k] = xk;
            grad[k] = (forward - backward) / (2.0 * h);
        }
        grad
    }
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

impl Optimizer for Bfgs {
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut obj = Counted {
            f: objective,
            evaluations: 0,
        };

        let mut x = Array1::from(initial_params);
        let mut fx = obj.eval(&x);
        let mut history = vec![fx];

        if n == 0 {
            return OptimizationResult {
                optimal_params: Vec::new(),
                optimal_value: fx,
                num_evaluations: obj.evaluations,
                num_iterations: 0,
                history,
                converged: true,
            };
        }

        let mut grad = obj.gradient(&x, self.step);
        let mut h_inv = Array2::<f64>::eye(n);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.maxiter {
            if max_abs(&grad) < self.gtol {
                converged = true;
                break;
            }

            let mut direction = -h_inv.dot(&grad);
            let mut slope = direction.dot(&grad);
            if slope >= 0.0 {
                // Curvature estimate went bad; restart from steepest descent.
                h_inv = Array2::eye(n);
                direction = grad.mapv(|g| -g);
                slope = direction.dot(&grad);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = &x + &(&direction * alpha);
                let f_candidate = obj.eval(&candidate);
                if f_candidate <= fx + ARMIJO_C1 * alpha * slope {
                    accepted = Some((candidate, f_candidate));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                // No descent step along the search direction.
                converged = true;
                break;
            };

            let grad_new = obj.gradient(&x_new, self.step);
            let s = &x_new - &x;
            let y = &grad_new - &grad;
            let improvement = fx - f_new;
            let scale = fx.abs().max(f_new.abs()).max(1.0);

            x = x_new;
            fx = f_new;
            grad = grad_new;
            iterations += 1;
            history.push(fx);

            if improvement <= self.ftol * scale {
                converged = true;
                break;
            }

            let sy = s.dot(&y);
            if sy > 0.0 {
                if iterations == 1 {
                    h_inv *= sy / y.dot(&y);
                }
                bfgs_update(&mut h_inv, &s, &y, sy);
            }
        }

        debug!(
            n_params = n,
            iterations,
            evaluations = obj.evaluations,
            value = fx,
            converged,
            "BFGS finished"
        );

        OptimizationResult {
            optimal_params: x.to_vec(),
            optimal_value: fx,
            num_evaluations: obj.evaluations,
            num_iterations: iterations,
            history,
            converged,
        }
    }
}

/// Inverse-Hessian update
/// H ← H + ((sᵀy + yᵀHy)/(sᵀy)²)·ssᵀ − (Hysᵀ + syᵀH)/sᵀy.
fn bfgs_update(h_inv: &mut Array2<f64>, s: &Array1<f64>, y: &Array1<f64>, sy: f64) {
    let hy = h_inv.dot(y);
    let yhy = y.dot(&hy);
    let a = (sy + yhy) / (sy * sy);
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            h_inv[[i, j]] += a * s[i] * s[j] - (hy[i] * s[j] + s[i] * hy[j]) / sy;
        }
    }
}
