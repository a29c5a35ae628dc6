//! # boneclone-sync
//!
//! Propagates skeleton files into target repositories.
//!
//! - [`git`]: clone, eligibility check, staging and pushing via the git CLI
//! - [`processor`]: direct and change-request landing strategies
//! - [`pipeline`]: concurrent fan-out over every discovered repository

pub mod error;
pub mod git;
pub mod pipeline;
pub mod processor;

pub use error::{GitError, GitResult, ProcessError, WiringError};
pub use git::{
    source_author, Eligibility, GitOperations, LandReport, RepositoryOperations, WorkingTree,
};
pub use pipeline::{run, RunSummary, SkippedProvider, UnitReport};
pub use processor::{
    head_branch_name, DirectStrategy, LandingStrategy, RequestStrategy, StrategyBuilder,
    UnitOutcome,
};
