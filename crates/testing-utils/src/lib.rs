//! # MachinaTrack Testing Utils
//!
//! Shared testing utilities for the MachinaTrack workspace.
//!
//! - **Mock Repositories**: in-memory implementations of every repository trait,
//!   including the transactional `apply_update` / `record_calibration` semantics
//! - **Test Data Builders**: entity builders with shop-floor defaults
//! - **Helpers**: fixed clocks and date shorthands
//!
//! ```toml
//! [dev-dependencies]
//! machinatrack-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
