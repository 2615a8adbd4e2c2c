//! # Watch-State Sync Module
//!
//! Keeps play counts and resume positions aligned between two media libraries.
//!
//! ## Overview
//!
//! This module manages:
//! - Fetching both libraries, or falling back to their last cached state
//! - Reconciling watch state item by item, always keeping the furthest progress
//! - Pushing changed items back to their library
//! - Persisting library snapshots and an auditable change log
//!
//! ## Components
//!
//! - **Reconciler** (`reconciler`): Pure merge of one snapshot against another
//! - **Snapshot Cache** (`cache`): One JSON file per library, keyed by address
//! - **Change Log** (`change_log`): Day-keyed JSON-lines log with one month retention
//! - **Sync Coordinator** (`coordinator`): Orchestrates the two lanes of a run

pub mod cache;
pub mod change_log;
pub mod coordinator;
pub mod error;
pub mod reconciler;

pub use cache::SnapshotCache;
pub use change_log::{ChangeLog, ChangeLogEntry};
pub use coordinator::{Lane, LaneReport, LaneState, SyncCoordinator, SyncReport};
pub use error::{Result, SyncError};
pub use reconciler::{reconcile, Reconciliation};
