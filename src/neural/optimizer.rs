//! Adam optimizer with per-parameter moment state.

use std::collections::HashMap;

use ndarray::{Array, ArrayD, Dimension, IxDyn, Zip};

/// Adaptive first/second-moment optimizer.
///
/// State is keyed by a caller-supplied parameter id, so one optimizer
/// instance serves every tensor in the model as long as ids stay stable
/// across steps.
pub struct AdamOptimizer {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    state: HashMap<String, AdamState>,
}

struct AdamState {
    m: ArrayD<f32>,
    v: ArrayD<f32>,
    t: u32,
}

impl AdamOptimizer {
    /// Creates an optimizer with the standard β₁ = 0.9, β₂ = 0.999, ε = 1e-8.
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            state: HashMap::new(),
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Applies one bias-corrected Adam update to `param` in place.
    pub fn step<D: Dimension>(
        &mut self,
        id: &str,
        param: &mut Array<f32, D>,
        grad: &Array<f32, D>,
    ) {
        assert_eq!(
            param.shape(),
            grad.shape(),
            "gradient shape differs from parameter '{}'",
            id
        );

        let state = self.state.entry(id.to_string()).or_insert_with(|| AdamState {
            m: ArrayD::zeros(IxDyn(grad.shape())),
            v: ArrayD::zeros(IxDyn(grad.shape())),
            t: 0,
        });
        state.t += 1;

        let (beta1, beta2) = (self.beta1, self.beta2);
        let grad_dyn = grad.view().into_dyn();
        state
            .m
            .zip_mut_with(&grad_dyn, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        state
            .v
            .zip_mut_with(&grad_dyn, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let correction1 = 1.0 - beta1.powi(state.t as i32);
        let correction2 = 1.0 - beta2.powi(state.t as i32);
        let lr = self.learning_rate;
        let epsilon = self.epsilon;

        let mut param_dyn = param.view_mut().into_dyn();
        Zip::from(&mut param_dyn)
            .and(&state.m)
            .and(&state.v)
            .for_each(|p, &m, &v| {
                let m_hat = m / correction1;
                let v_hat = v / correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn step_moves_against_gradient() {
        let mut optimizer = AdamOptimizer::new(0.1);
        let mut param: Array1<f32> = array![1.0, -1.0];
        let grad: Array1<f32> = array![0.5, -0.5];

        optimizer.step("p", &mut param, &grad);
        assert!(param[0] < 1.0);
        assert!(param[1] > -1.0);
    }

    #[test]
    fn first_step_size_approaches_learning_rate() {
        // With bias correction, the very first update is ~lr * sign(grad).
        let mut optimizer = AdamOptimizer::new(0.01);
        let mut param: Array1<f32> = array![0.0];
        let grad: Array1<f32> = array![3.0];

        optimizer.step("p", &mut param, &grad);
        assert!((param[0] + 0.01).abs() < 1e-4);
    }

    #[test]
    fn state_is_tracked_per_id() {
        let mut optimizer = AdamOptimizer::new(0.1);
        let mut a: Array1<f32> = array![0.0];
        let mut b: Array1<f32> = array![0.0];
        let grad: Array1<f32> = array![1.0];

        // Stepping `a` twice builds momentum that `b` must not inherit.
        optimizer.step("a", &mut a, &grad);
        optimizer.step("a", &mut a, &grad);
        optimizer.step("b", &mut b, &grad);

        let mut fresh = AdamOptimizer::new(0.1);
        let mut c: Array1<f32> = array![0.0];
        fresh.step("c", &mut c, &grad);
        assert!((b[0] - c[0]).abs() < 1e-7);
    }
}
