//! Basic flow tests for the core crate.
//! These tests drive the scoring engine and the tracker through their public API.

mod scoring_flows;
mod tracker_flows;
