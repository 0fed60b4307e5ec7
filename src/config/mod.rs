//! # Configuration Module
//!
//! This module provides the configuration structure for vector rendering sessions.

pub mod config;

pub use config::BeamConfig;
