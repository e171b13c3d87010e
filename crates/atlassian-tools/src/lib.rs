//! Confluence + Jira REST plumbing behind the Atlassian MCP server.
//!
//! Layering, bottom up:
//! - [`config`]: connection parameters resolved from the environment
//! - [`client`] / [`confluence`] / [`jira`]: one authenticated REST client per backend
//! - [`registry`]: lazy, process-lifetime client singletons
//! - [`normalize`]: raw backend JSON -> stable minimal projections
//! - [`catalog`]: the fixed tool table (validation, dispatch, MCP schemas)
//!
//! The binary crate only wires a stdio transport on top of [`catalog`].

pub mod catalog;
pub mod client;
pub mod config;
pub mod confluence;
pub mod error;
pub mod jira;
pub mod normalize;
pub mod registry;

pub use error::{Error, Result};
