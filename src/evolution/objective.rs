use crate::evolution::aggregator::{Aggregator, ArithmeticMean};
use crate::evolution::EvolutionError;
use itertools::izip;
use ndarray::{s, Array1, Array2, ArrayView1};

/// Cost to minimize for a candidate weight vector.
///
/// Implementations only read shared data, which is what allows the engine to
/// evaluate a generation in parallel.
pub trait FitnessFunction: std::fmt::Debug + Send + Sync {
    fn compute(&self, genes: &[f64]) -> Result<f64, EvolutionError>;

    /// Number of genes the function expects, if it constrains it.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Validated feature matrix / target vector pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionData {
    features: Array2<f64>,
    target: Array1<f64>,
}

impl RegressionData {
    pub fn new(features: Array2<f64>, target: Array1<f64>) -> Result<Self, EvolutionError> {
        if features.nrows() != target.len() {
            return Err(EvolutionError::ShapeMismatch(format!(
                "features have {} rows but target has {} values",
                features.nrows(),
                target.len()
            )));
        }
        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(EvolutionError::ShapeMismatch(format!(
                "feature matrix must be non-empty, got {}x{}",
                features.nrows(),
                features.ncols()
            )));
        }
        Ok(RegressionData { features, target })
    }

    /// Builds the matrix from row slices, rejecting ragged input.
    pub fn from_rows(rows: &[Vec<f64>], target: &[f64]) -> Result<Self, EvolutionError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(EvolutionError::ShapeMismatch(format!(
                "row {} has {} columns, expected {}",
                index,
                row.len(),
                width
            )));
        }
        let flat = rows.iter().flatten().copied().collect::<Vec<f64>>();
        let features = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| EvolutionError::ShapeMismatch(e.to_string()))?;
        Self::new(features, Array1::from(target.to_vec()))
    }

    pub fn rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    /// Splits into the first `index` rows and the rest (train / holdout).
    pub fn split_at(&self, index: usize) -> Result<(Self, Self), EvolutionError> {
        if index == 0 || index >= self.rows() {
            return Err(EvolutionError::ShapeMismatch(format!(
                "split index {} leaves an empty side for {} rows",
                index,
                self.rows()
            )));
        }
        let head = Self::new(
            self.features.slice(s![..index, ..]).to_owned(),
            self.target.slice(s![..index]).to_owned(),
        )?;
        let tail = Self::new(
            self.features.slice(s![index.., ..]).to_owned(),
            self.target.slice(s![index..]).to_owned(),
        )?;
        Ok((head, tail))
    }
}

/// Mean squared error between `features · genes` and the target.
#[derive(Debug, Clone)]
pub struct MeanSquaredError {
    data: RegressionData,
}

impl MeanSquaredError {
    pub fn new(data: RegressionData) -> Self {
        MeanSquaredError { data }
    }

    pub fn data(&self) -> &RegressionData {
        &self.data
    }

    pub fn predict(&self, genes: &[f64]) -> Result<Array1<f64>, EvolutionError> {
        if genes.len() != self.data.dimension() {
            return Err(EvolutionError::ShapeMismatch(format!(
                "weight vector has {} genes but features have {} columns",
                genes.len(),
                self.data.dimension()
            )));
        }
        Ok(self.data.features.dot(&ArrayView1::from(genes)))
    }
}

impl FitnessFunction for MeanSquaredError {
    fn compute(&self, genes: &[f64]) -> Result<f64, EvolutionError> {
        let predicted = self.predict(genes)?;
        let squared_errors = izip!(predicted.iter(), self.data.target.iter())
            .map(|(prediction, target)| (prediction - target).powi(2))
            .collect::<Vec<f64>>();
        Ok(ArithmeticMean.value(&squared_errors)?)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.data.dimension())
    }
}
