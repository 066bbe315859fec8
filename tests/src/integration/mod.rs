//! # Integration Flows
//!
//! Proposer and validator running the same data square pipeline.

pub mod proposal_flows;
