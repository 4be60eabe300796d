//! Portfolio API - project listings and visitor analytics backend
//!
//! # Architecture
//! - `storage`: sea-orm backed persistence for projects, page views, clicks and sessions
//! - `services`: session tracking, user-agent classification, dashboard aggregation, project CRUD
//! - `api`: HTTP handlers, routes and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
