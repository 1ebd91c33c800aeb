//! Event Monitoring record acquisition.
//!
//! Reports do not care where their rows come from. This module turns either
//! the Salesforce Event Monitoring API or local CSV files into the flat
//! `Vec<Record>` the aggregation pipeline consumes.

pub mod parser;
pub mod source;
pub mod types;
