use statrs::statistics::Statistics;
use thiserror::Error;

/// Aggregator trait which reduces a series to a single f64 number.
/// Used both for the squared-error cost and for the per-generation logbook.
pub trait Aggregator: Sync + Send {
    fn value(&self, series: &[f64]) -> Result<f64, AggregatorError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Cannot aggregate an empty series with `{0}`")]
    EmptySeries(&'static str),
}

pub struct ArithmeticMean;
impl Aggregator for ArithmeticMean {
    fn value(&self, series: &[f64]) -> Result<f64, AggregatorError> {
        if series.is_empty() {
            return Err(AggregatorError::EmptySeries("ArithmeticMean"));
        }
        Ok(Statistics::mean(series.iter()))
    }
}

pub struct Minimum;
impl Aggregator for Minimum {
    fn value(&self, series: &[f64]) -> Result<f64, AggregatorError> {
        if series.is_empty() {
            return Err(AggregatorError::EmptySeries("Minimum"));
        }
        // statrs propagates NaN, a single diverged individual must not hide the real minimum
        let finite = series
            .iter()
            .copied()
            .filter(|value| !value.is_nan())
            .collect::<Vec<f64>>();
        if finite.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(Statistics::min(finite.iter()))
    }
}
