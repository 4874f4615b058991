pub mod classify;
pub mod config;
pub mod feeds;
pub mod fetch;
pub mod ledger;
pub mod legend;
pub mod normalize;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod present;
pub mod publish;
pub mod registry;
pub mod stats;
pub mod surface;
