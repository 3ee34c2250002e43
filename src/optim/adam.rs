use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;

/// First and second moment estimates for one parameter tensor.
#[derive(Debug, Clone)]
struct Moments {
    m: Matrix,
    v: Matrix,
}

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    beta1_t: f64,
    beta2_t: f64,
    t: u32,
    moments: Vec<Moments>,
}

impl Adam {
    /// Creates an `Adam` optimizer with β1 = 0.9 and β2 = 0.999.
    ///
    /// Moment buffers are allocated on the first `step`, sized to the
    /// network's parameters.
    pub fn new(learning_rate: f64, epsilon: f64) -> Self {
        Self::with_betas(learning_rate, 0.9, 0.999, epsilon)
    }

    pub fn with_betas(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            beta1_t: 1.,
            beta2_t: 1.,
            t: 0,
            moments: Vec::new(),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> u32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, network: &mut Network) -> Result<()> {
        let mut params = network.parameters_mut();

        if self.moments.is_empty() {
            self.moments = params.iter()
                .map(|p| Moments {
                    m: Matrix::zeros(p.value.rows, p.value.cols),
                    v: Matrix::zeros(p.value.rows, p.value.cols),
                })
                .collect();
        }

        if params.len() != self.moments.len() {
            return Err(Error::shape(
                format!("{} parameter tensors", self.moments.len()),
                format!("{} parameter tensors", params.len()),
            ));
        }
        for (param, moments) in params.iter().zip(self.moments.iter()) {
            if param.value.shape() != moments.m.shape() || param.grad.shape() != param.value.shape() {
                return Err(Error::shape(
                    format!("{:?}", moments.m.shape()),
                    format!("{:?} (grad {:?})", param.value.shape(), param.grad.shape()),
                ));
            }
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.t += 1;
        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        for (param, moments) in params.iter_mut().zip(self.moments.iter_mut()) {
            let rows = param.value.data.iter_mut()
                .zip(param.grad.data.iter())
                .zip(moments.m.data.iter_mut())
                .zip(moments.v.data.iter_mut());
            for (((p_row, g_row), m_row), v_row) in rows {
                p_row.iter_mut()
                    .zip(g_row)
                    .zip(m_row.iter_mut())
                    .zip(v_row.iter_mut())
                    .for_each(|(((p, g), m), v)| {
                        *m = b1 * *m + (1. - b1) * g;
                        *v = b2 * *v + (1. - b2) * g.powi(2);
                        *p -= step_size * *m / (v.sqrt() + eps);
                    });
            }
        }

        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
