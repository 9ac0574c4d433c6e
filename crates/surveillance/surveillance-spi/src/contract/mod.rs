//! Contract module containing trait definitions for simulation and forecasting

mod case_model;
mod regressor;

pub use case_model::{CaseModel, WeekContext};
pub use regressor::Regressor;
