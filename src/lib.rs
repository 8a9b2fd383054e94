//! A sandboxed test-execution worker.
//!
//! Accepts execution requests describing a prepared source workspace and a
//! target language, runs the workspace's test suite inside an isolated,
//! resource-capped container, captures stdout/stderr, parses the
//! language-specific test output into a structured [`model::TestResult`],
//! and publishes it to a result sink.
//!
//! Data flow: Message -> [`handler::RequestHandler`] -> [`gate::ConcurrencyGate`]
//! -> [`sandbox::SandboxExecutor`] -> ([`runtime::RuntimeAdapter`] x [`profile`]
//! x [`logs`]) -> raw result -> [`parsers`] -> structured result -> Message.
//!
//! Workspace provisioning, the message bus, result persistence, and image
//! caching are external collaborators — this crate consumes
//! `(execution_id, language, workspace_path, command_override?, limits)` and
//! produces `(exit_code, duration, output, parsed result)`.

pub mod config;
pub mod error;
pub mod gate;
pub mod handler;
pub mod http;
pub mod logs;
pub mod model;
pub mod parsers;
pub mod profile;
pub mod queue;
pub mod runtime;
pub mod sandbox;
