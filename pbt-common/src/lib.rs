//! # PBT Common Library
//!
//! Shared code for the Pitcher Biomechanics Tracker:
//! - Database schema, models and queries (players, sessions)
//! - Configuration loading and root folder resolution
//! - Uploaded file storage keyed by opaque storage keys
//! - Video source classification and YouTube id extraction
//! - Kinematic CSV parsing and chart series construction

pub mod config;
pub mod db;
pub mod error;
pub mod kinematics;
pub mod metrics;
pub mod storage;
pub mod video;

pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use metrics::MetricPalette;
pub use video::VideoSource;
