use crate::{
    bson::Document,
    bson_util,
    error::{ErrorKind, Result},
    operation::{Aspects, CommandOperation, OperationParent},
    options::CommandOptions,
    server::Transport,
    session::ClientSession,
};

/// An arbitrary caller-supplied command, dispatched against a database without interpreting
/// its body.
#[derive(Clone, Debug)]
pub struct RunCommand {
    inner: CommandOperation,
    command: Document,
}

impl RunCommand {
    /// Creates an operation running `command` against the parent entity's database, or
    /// against the options' database override when one is set.
    pub fn new(
        parent: Option<&dyn OperationParent>,
        command: Document,
        options: Option<CommandOptions>,
    ) -> Result<Self> {
        if bson_util::first_key(&command).is_none() {
            return Err(ErrorKind::InvalidArgument {
                message: "an empty document cannot be passed to a run_command operation".into(),
            }
            .into());
        }

        Ok(Self {
            inner: CommandOperation::new(Aspects::empty(), parent, options)?,
            command,
        })
    }

    /// The command operation this kind is built on.
    pub fn operation(&self) -> &CommandOperation {
        &self.inner
    }

    /// Executes the command, resolving with the server's reply.
    pub async fn execute<T: Transport + ?Sized>(
        &self,
        transport: &T,
        session: Option<&ClientSession>,
    ) -> Result<Document> {
        self.inner
            .execute_command(transport, session, &self.command)
            .await
    }
}
