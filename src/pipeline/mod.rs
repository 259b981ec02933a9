//! Training and evaluation pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Matching any two learners over a number of games
//! - Evaluating the engine against fixed opponents
//! - Recording observations during a run

pub mod learners;
pub mod observers;
pub mod training;

pub use learners::{EnsembleLearner, MctsLearner, MinimaxLearner, RandomLearner};
pub use observers::{
    JsonlObserver, MetricsObserver, MetricsSummary, Observation, ProgressObserver,
    StepObservation, TracingObserver,
};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Learner, Observer};
