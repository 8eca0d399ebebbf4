use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::{DispatchError, Prediction, Predictor};
use crate::gauge::clamp_score;
use crate::input::ManualRecord;
use crate::model::ModelKind;

/// Starting point of the manual heuristic before bonuses.
pub const BASE_SCORE: f64 = 50.0;

/// Score bonuses of the manual heuristic, before the random adjustment.
pub fn manual_base_score(record: &ManualRecord) -> f64 {
    let mut score = BASE_SCORE;
    if record.koi_fpflag_ss == 0 {
        score += 15.0;
    }
    if record.koi_fpflag_nt == 0 {
        score += 15.0;
    }
    if record.koi_fpflag_co == 0 {
        score += 10.0;
    }
    if record.koi_fpflag_ec == 0 {
        score += 10.0;
    }
    if (1.0..=10.0).contains(&record.koi_duration) {
        score += 10.0;
    }
    if record.koi_count.is_some_and(|count| (1..=5).contains(&count)) {
        score += 5.0;
    }
    score
}

/// Add the random adjustment (within `[-5, 10)`) and clamp into `[0, 100]`.
pub fn adjust(base: f64, adjustment: f64) -> f64 {
    clamp_score(base + adjustment)
}

pub fn manual_score<R: Rng + ?Sized>(record: &ManualRecord, rng: &mut R) -> f64 {
    adjust(manual_base_score(record), rng.gen_range(-5.0..10.0))
}

/// Placeholder score for an uploaded file: an integer in `60..100`.
pub fn file_score<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(60u32..100))
}

/// Local stand-in for real inference. Performs no modelling at all.
#[derive(Debug)]
pub struct HeuristicPredictor {
    rng: Mutex<StdRng>,
}

impl Default for HeuristicPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicPredictor {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible scorer for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn file_score(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        file_score(&mut *rng)
    }

    pub fn manual_score(&self, record: &ManualRecord) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        manual_score(record, &mut *rng)
    }
}

#[async_trait]
impl Predictor for HeuristicPredictor {
    async fn predict(
        &self,
        model: ModelKind,
        record: &ManualRecord,
    ) -> Result<Prediction, DispatchError> {
        let score = self.manual_score(record);
        debug!(model = model.id(), score, "heuristic score computed");
        Ok(Prediction::from_score(score))
    }
}
