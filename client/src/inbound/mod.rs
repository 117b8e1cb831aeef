//! Inbound adapters that translate user requests into session manager calls
//! while keeping argument parsing and output formatting at the edge.

pub mod cli;
