//! Lanesync publishes a pull request's component changes to a registry lane.
//!
//! A run checks the build tool and registry scope, reads the workspace's
//! change status, keeps `<component>@<bump>` labels on the pull request in
//! step with the changed components, snaps and exports the changes to a lane
//! named after the pull request, and maintains a single bot comment linking
//! to it.
//!
//! Every external system sits behind a trait: [`tool::BuildTool`],
//! [`gate::RegistryClient`], [`github::CommentGateway`],
//! [`github::LabelGateway`] and [`local::CommitSource`]. The
//! [`pipeline::Orchestrator`] receives them together with an explicit
//! [`pipeline::PipelineConfig`].

pub mod comment;
pub mod config;
pub mod error;
pub mod gate;
pub mod github;
pub mod labels;
pub mod lane;
pub mod local;
pub mod pipeline;
pub mod scope;
pub mod status;
pub mod telemetry;
pub mod tool;

pub use config::LanesyncConfig;
pub use error::PipelineError;
pub use pipeline::{Collaborators, Orchestrator, PipelineConfig, PipelineOutcome};
pub use scope::ScopeRef;
