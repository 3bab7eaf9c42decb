use crate::{
    bson::doc,
    error::Result,
    operation::{Aspects, CommandOperation, OperationParent},
    options::CommandOptions,
    server::Transport,
    session::ClientSession,
};

/// Drops the parent collection.
#[derive(Clone, Debug)]
pub struct DropCollection {
    inner: CommandOperation,
    coll: String,
}

impl DropCollection {
    /// Creates an operation dropping the parent entity's collection.
    pub fn new(parent: &dyn OperationParent, options: Option<CommandOptions>) -> Result<Self> {
        Ok(Self {
            coll: parent.namespace().coll.clone(),
            inner: CommandOperation::new(Aspects::WRITE_OPERATION, Some(parent), options)?,
        })
    }

    /// The command operation this kind is built on.
    pub fn operation(&self) -> &CommandOperation {
        &self.inner
    }

    /// Executes the operation. A successful reply carries no payload of interest.
    pub async fn execute<T: Transport + ?Sized>(
        &self,
        transport: &T,
        session: Option<&ClientSession>,
    ) -> Result<()> {
        self.inner
            .execute_command(transport, session, &doc! { "drop": self.coll.clone() })
            .await?;
        Ok(())
    }
}
