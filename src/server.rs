//! The transport boundary that command operations dispatch through.

use futures_core::future::BoxFuture;

use crate::{
    bson::Document,
    error::Result,
    namespace::Namespace,
    options::CommandOptions,
};

/// Contains information about the server on the other end of a transport, in the form the
/// decoration pipeline consumes.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ServerDescription {
    /// The address of the server.
    pub address: String,

    /// The maximum wire version the server understands, as reported in its handshake reply.
    /// `None` if the handshake has not completed.
    pub max_wire_version: Option<i32>,
}

impl ServerDescription {
    /// Describes the server at `address` reporting the given maximum wire version.
    pub fn new(address: impl Into<String>, max_wire_version: impl Into<Option<i32>>) -> Self {
        Self {
            address: address.into(),
            max_wire_version: max_wire_version.into(),
        }
    }

    /// The wire version used for capability gating. An unknown version gates as 0, so no
    /// optional feature is assumed supported.
    pub fn wire_version(&self) -> i32 {
        self.max_wire_version.unwrap_or(0)
    }
}

/// The options forwarded to a transport alongside a decorated command.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ExecutionOptions {
    /// Whether the caller wants the complete server reply rather than just the result
    /// payload.
    pub full_response: bool,

    /// The options the operation was constructed with, for transports that consult them.
    pub options: CommandOptions,
}

/// A handle to a server capable of executing a single, fully-decorated command.
///
/// Implementations own connection management and wire encoding. A reply of `ok: 0` is
/// expected to resolve as [`ErrorKind::Command`](crate::error::ErrorKind::Command); all
/// failures pass through to the caller verbatim, with no retry at this layer.
pub trait Transport {
    /// A description of the server this transport is connected to.
    fn description(&self) -> &ServerDescription;

    /// Sends a command to the namespace's database and resolves with the server's reply.
    fn send<'a>(
        &'a self,
        ns: &'a Namespace,
        command: Document,
        options: ExecutionOptions,
    ) -> BoxFuture<'a, Result<Document>>;
}
