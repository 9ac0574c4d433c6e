//! Random forest regression
//!
//! - `tree`: CART regression tree with impurity-decrease bookkeeping
//! - `ensemble`: bootstrap-aggregated forest implementing `Regressor`

mod ensemble;
mod tree;

pub use ensemble::RandomForestRegressor;
pub use tree::{RegressionTree, TreeParams};
