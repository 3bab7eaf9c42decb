#![doc = include_str!("../README.md")]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]
#![allow(clippy::derive_partial_eq_without_eq)]

pub use bson;

mod bson_util;
mod collation;
mod concern;
pub mod error;
mod explain;
mod namespace;
mod operation;
pub mod options;
mod serde_util;
mod server;
mod session;
mod trace;

pub use crate::{
    collation::{
        Collation,
        CollationAlternate,
        CollationCaseFirst,
        CollationMaxVariable,
        CollationStrength,
    },
    concern::{Acknowledgment, ReadConcern, ReadConcernLevel, WriteConcern},
    explain::{Explain, ExplainOption, ExplainVerbosity},
    namespace::Namespace,
    operation::{
        Aspects,
        CommandOperation,
        DecorationContext,
        Distinct,
        DropCollection,
        OperationParent,
        RunCommand,
    },
    server::{ExecutionOptions, ServerDescription, Transport},
    session::ClientSession,
    trace::COMMAND_TRACING_EVENT_TARGET,
};
