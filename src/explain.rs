use serde::{Deserialize, Serialize};

use crate::{
    bson::{doc, Document},
    options::CommandOptions,
};

/// The verbosity of the execution plan returned by an explained command.
///
/// See the documentation [here](https://www.mongodb.com/docs/manual/reference/command/explain/)
/// for more information on each mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum ExplainVerbosity {
    /// Runs the query planner and returns the winning plan without executing the command.
    QueryPlanner,

    /// Executes the winning plan and returns statistics describing its execution.
    ExecutionStats,

    /// Like `ExecutionStats`, but also includes execution statistics for the rejected
    /// candidate plans.
    AllPlansExecution,
}

impl ExplainVerbosity {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ExplainVerbosity::QueryPlanner => "queryPlanner",
            ExplainVerbosity::ExecutionStats => "executionStats",
            ExplainVerbosity::AllPlansExecution => "allPlansExecution",
        }
    }
}

/// A request to return a command's execution plan rather than its normal result.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Explain {
    /// The requested verbosity.
    pub verbosity: ExplainVerbosity,
}

impl Explain {
    /// An explain directive with the given verbosity.
    pub fn new(verbosity: ExplainVerbosity) -> Self {
        Self { verbosity }
    }

    /// Resolves the explain directive for an explainable operation from its options. Returns
    /// `None` when no explain option was supplied.
    ///
    /// A bare `true` requests the most verbose plan; a bare `false` requests the planner
    /// summary only.
    pub fn from_options(options: &CommandOptions) -> Option<Self> {
        options.explain.as_ref().map(|explain| match explain {
            ExplainOption::Enabled(true) => Self::new(ExplainVerbosity::AllPlansExecution),
            ExplainOption::Enabled(false) => Self::new(ExplainVerbosity::QueryPlanner),
            ExplainOption::Verbosity(verbosity) => Self::new(*verbosity),
        })
    }

    /// Wraps a command into its explain form. A command that already carries an `explain` key
    /// is returned unchanged.
    pub(crate) fn wrap_command(&self, command: Document) -> Document {
        if command.contains_key("explain") {
            return command;
        }

        doc! {
            "explain": command,
            "verbosity": self.verbosity.as_str(),
        }
    }
}

/// The loosely-typed form an explain request takes in an options bag: either a bare toggle or
/// an explicit verbosity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum ExplainOption {
    /// Toggle explain on or off without naming a verbosity.
    Enabled(bool),

    /// Request a specific verbosity.
    Verbosity(ExplainVerbosity),
}

impl From<bool> for ExplainOption {
    fn from(enabled: bool) -> Self {
        ExplainOption::Enabled(enabled)
    }
}

impl From<ExplainVerbosity> for ExplainOption {
    fn from(verbosity: ExplainVerbosity) -> Self {
        ExplainOption::Verbosity(verbosity)
    }
}
