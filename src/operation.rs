//! Command operations: construction, capability-gated decoration, and dispatch.

mod distinct;
mod drop_collection;
mod run_command;

#[cfg(test)]
mod test;

use bitflags::bitflags;

use crate::{
    bson::{self, Document},
    bson_util,
    concern::{ReadConcern, WriteConcern},
    error::{Error, ErrorKind, Result},
    explain::Explain,
    namespace::{Namespace, DEFAULT_COMMAND_DB},
    options::{resolve_options, CommandOptions},
    serde_util,
    server::{ExecutionOptions, ServerDescription, Transport},
    session::ClientSession,
    trace::{TracingRepresentation, COMMAND_TRACING_EVENT_TARGET},
};

pub use distinct::Distinct;
pub use drop_collection::DropCollection;
pub use run_command::RunCommand;

/// The wire version of the first server release that accepts write concern and collation on
/// commands.
pub(crate) const SERVER_3_4_0_WIRE_VERSION: i32 = 5;

/// The wire version of the first server release whose aggregate command understands explain
/// verbosity.
pub(crate) const SERVER_3_6_0_WIRE_VERSION: i32 = 6;

/// Command verbs that accept a `readConcern` field.
const READ_CONCERN_COMMANDS: &[&str] = &[
    "aggregate",
    "count",
    "distinct",
    "find",
    "geoNear",
    "geoSearch",
    "parallelCollectionScan",
];

/// Whether a command document's verb accepts a `readConcern` field.
pub(crate) fn command_supports_read_concern(command: &Document) -> bool {
    bson_util::first_key(command)
        .map_or(false, |verb| READ_CONCERN_COMMANDS.contains(&verb))
}

bitflags! {
    /// Static capability tags attached to each operation kind. The shared decoration
    /// pipeline consults these instead of branching per kind; they never change after an
    /// operation is constructed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Aspects: u8 {
        /// The operation can return its execution plan instead of a result.
        const EXPLAINABLE     = 0b0000_0001;

        /// The operation mutates data and takes a write concern.
        const WRITE_OPERATION = 0b0000_0010;
    }
}

/// The database or collection entity a command operation is created from. Supplies the
/// namespace commands are dispatched against and the concerns an operation inherits when its
/// own options leave them unset.
pub trait OperationParent {
    /// The entity's namespace.
    fn namespace(&self) -> &Namespace;

    /// The read concern operations against this entity inherit.
    fn read_concern(&self) -> Option<&ReadConcern> {
        None
    }

    /// The write concern operations against this entity inherit.
    fn write_concern(&self) -> Option<&WriteConcern> {
        None
    }
}

/// The execution-time signals a command is decorated against: the capabilities of the server
/// about to receive it, and whether the call is running inside a multi-statement transaction.
#[derive(Clone, Copy, Debug)]
pub struct DecorationContext<'a> {
    /// The server the decorated command will be sent to.
    pub description: &'a ServerDescription,

    /// Whether a multi-statement transaction is currently active.
    pub in_transaction: bool,
}

/// A single database command in flight: the target namespace and concern settings are
/// resolved once at construction, and the caller's command document is decorated against a
/// live server's capabilities each time the operation executes.
///
/// An instance supports one in-flight call at a time; reusing it for overlapping calls is a
/// caller error. Sequential execution against different servers is safe, as no state is
/// carried over between calls.
#[derive(Clone, Debug)]
pub struct CommandOperation {
    ns: Namespace,
    aspects: Aspects,
    read_concern: Option<ReadConcern>,
    write_concern: Option<WriteConcern>,
    explain: Option<Explain>,
    full_response: bool,
    options: CommandOptions,
}

impl CommandOperation {
    /// Creates an operation of the kind described by `aspects` against `parent`, resolving
    /// its namespace and concerns. No I/O occurs here.
    ///
    /// The namespace database is taken from the options' database override when one is set,
    /// then from the parent, then defaults to `admin`; the collection component is always the
    /// `$cmd` pseudo-collection. Supplying an explain option for a kind without the
    /// [`EXPLAINABLE`](Aspects::EXPLAINABLE) aspect fails here, before anything is sent.
    pub fn new(
        aspects: Aspects,
        parent: Option<&dyn OperationParent>,
        options: Option<CommandOptions>,
    ) -> Result<Self> {
        let mut options = options;
        if let Some(parent) = parent {
            resolve_options!(parent, options, [read_concern, write_concern]);
        }
        let options = options.unwrap_or_default();

        let ns = match options.db_name_override() {
            Some(db) => Namespace::command(db),
            None => match parent {
                Some(parent) => parent.namespace().with_command_collection(),
                None => Namespace::command(DEFAULT_COMMAND_DB),
            },
        };

        let explain = if aspects.contains(Aspects::EXPLAINABLE) {
            Explain::from_options(&options)
        } else if options.explain.is_some() {
            return Err(ErrorKind::InvalidArgument {
                message: "explain is not supported on this command".to_string(),
            }
            .into());
        } else {
            None
        };

        Ok(Self {
            ns,
            aspects,
            read_concern: ReadConcern::from_options(&options),
            write_concern: WriteConcern::from_options(&options),
            explain,
            full_response: options.full_response.unwrap_or(false),
            options,
        })
    }

    /// The namespace this operation dispatches against.
    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// The read concern resolved for this operation, if any.
    pub fn read_concern(&self) -> Option<&ReadConcern> {
        self.read_concern.as_ref()
    }

    /// The write concern resolved for this operation, if any.
    pub fn write_concern(&self) -> Option<&WriteConcern> {
        self.write_concern.as_ref()
    }

    /// The explain directive active on this operation, if any.
    pub fn explain(&self) -> Option<&Explain> {
        self.explain.as_ref()
    }

    /// Whether this operation's kind carries the given aspect.
    pub fn has_aspect(&self, aspect: Aspects) -> bool {
        self.aspects.contains(aspect)
    }

    /// Whether an outer retry layer may retry this operation as a write.
    ///
    /// An explained write is diagnostic rather than a real mutation and must not be retried
    /// as one, so an active explain directive makes an explainable operation ineligible.
    pub fn can_retry_write(&self) -> bool {
        if self.has_aspect(Aspects::EXPLAINABLE) {
            return self.explain.is_none();
        }
        true
    }

    /// Produces the decorated form of `command` for the server and transaction state in
    /// `ctx`. The input document is left untouched.
    ///
    /// Each step either adds a field to the output, is a no-op, or (for the collation
    /// capability check alone) fails the whole call. The steps run in a fixed order: the
    /// collation check precedes every field sharing its version gate, so a server too old
    /// for collation rejects the call before any partial decoration escapes.
    pub fn decorate_command(
        &self,
        command: &Document,
        ctx: DecorationContext<'_>,
    ) -> Result<Document> {
        let mut cmd = command.clone();
        let wire_version = ctx.description.wire_version();

        if let Some(read_concern) = &self.read_concern {
            if command_supports_read_concern(&cmd) && !ctx.in_transaction {
                cmd.insert("readConcern", bson::to_bson(read_concern)?);
            }
        }

        if self.options.collation.is_some() && wire_version < SERVER_3_4_0_WIRE_VERSION {
            return Err(Error::unsupported_by_server(
                &ctx.description.address,
                wire_version,
                "collation",
            ));
        }

        if wire_version >= SERVER_3_4_0_WIRE_VERSION {
            if !ctx.in_transaction && self.has_aspect(Aspects::WRITE_OPERATION) {
                if let Some(write_concern) = &self.write_concern {
                    cmd.insert("writeConcern", bson::to_bson(write_concern)?);
                }
            }

            if let Some(collation) = &self.options.collation {
                cmd.insert("collation", bson::to_bson(collation)?);
            }
        }

        if let Some(max_time) = self.options.max_time {
            cmd.insert("maxTimeMS", serde_util::duration_as_int_millis(max_time));
        }

        if let Some(comment) = &self.options.comment {
            cmd.insert("comment", comment.as_str());
        }

        if tracing::enabled!(target: COMMAND_TRACING_EVENT_TARGET, tracing::Level::DEBUG) {
            tracing::debug!(
                target: COMMAND_TRACING_EVENT_TARGET,
                command = cmd.tracing_representation(),
                namespace = %self.ns,
                "executing command"
            );
        }

        if self.has_aspect(Aspects::EXPLAINABLE) {
            if let Some(explain) = &self.explain {
                if wire_version < SERVER_3_6_0_WIRE_VERSION && cmd.contains_key("aggregate") {
                    // servers below 3.6 ignore verbosity on aggregate and only understand a
                    // boolean toggle
                    cmd.insert("explain", true);
                } else {
                    cmd = explain.wrap_command(cmd);
                }
            }
        }

        Ok(cmd)
    }

    /// Decorates `command` against the live server behind `transport` and forwards it for
    /// execution, resolving with the transport's reply.
    ///
    /// Failures raised before dispatch (the collation capability check) mean the transport is
    /// never invoked and the server observes no side effect.
    pub async fn execute_command<T: Transport + ?Sized>(
        &self,
        transport: &T,
        session: Option<&ClientSession>,
        command: &Document,
    ) -> Result<Document> {
        let ctx = DecorationContext {
            description: transport.description(),
            in_transaction: session.map_or(false, |session| session.in_transaction()),
        };
        let cmd = self.decorate_command(command, ctx)?;

        let options = ExecutionOptions {
            full_response: self.full_response,
            options: self.options.clone(),
        };

        transport.send(&self.ns, cmd, options).await
    }
}
