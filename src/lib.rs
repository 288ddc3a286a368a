//! webstacks assembles CloudFormation templates for web application
//! deployments - networking, compute, storage, caching, database, CDN,
//! load balancing, container registry, and IAM resources - and serializes
//! the result to JSON. Nothing here executes against live infrastructure;
//! the output document is consumed by CloudFormation itself.

/// Command-line interface module for the webstacks application
pub mod cli;

/// Deployment variant configuration passed into the composition function
pub mod config;

/// Parameter default overrides loaded from an external JSON/YAML file
pub mod defaults;

/// Error types and handling for the webstacks application
pub mod error;

/// CloudFormation property values and intrinsic function expressions
pub mod expr;

/// Resource definition modules and the stack composition function
pub mod stack;

/// Common tag injection over heterogeneous tag container shapes
pub mod tags;

/// The template builder: accumulates declarations and serializes them
pub mod template;
