use crate::error::{Error, Result};
use std::fmt;

/// Running k-effective estimate over the active batches seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeffEstimate {
    pub mean: f64,
    /// Sample standard deviation; None until at least two batches are active
    pub std_dev: Option<f64>,
    pub n: usize,
}

impl fmt::Display for KeffEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.std_dev {
            Some(std) => write!(f, "{:.6} +/- {:.6}", self.mean, std),
            None => write!(f, "{:.6}", self.mean),
        }
    }
}

/// Arithmetic mean of a series.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientSamples {
            required: 1,
            found: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs two or more values.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(Error::InsufficientSamples {
            required: 2,
            found: n,
        });
    }
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Ok(variance.sqrt())
}

/// Mean and, when defined, standard deviation of the active-batch estimates.
pub fn calculate_keff(values: &[f64]) -> Result<KeffEstimate> {
    let mean = mean(values)?;
    let std_dev = if values.len() >= 2 {
        Some(std_dev(values)?)
    } else {
        None
    };
    Ok(KeffEstimate {
        mean,
        std_dev,
        n: values.len(),
    })
}

/// Append-only series of active-batch k-effective values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeffSeries {
    values: Vec<f64>,
}

impl KeffSeries {
    pub fn with_capacity(n_active: usize) -> Self {
        Self {
            values: Vec::with_capacity(n_active),
        }
    }

    pub fn push(&mut self, keff: f64) {
        self.values.push(keff);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Estimate over the whole series, recomputed from scratch. None while empty.
    pub fn estimate(&self) -> Result<Option<KeffEstimate>> {
        if self.values.is_empty() {
            return Ok(None);
        }
        calculate_keff(&self.values).map(Some)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}
