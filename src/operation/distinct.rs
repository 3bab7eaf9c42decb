use serde::Deserialize;

use crate::{
    bson::{self, doc, Bson, Document},
    error::Result,
    operation::{Aspects, CommandOperation, OperationParent},
    options::CommandOptions,
    server::Transport,
    session::ClientSession,
};

/// Finds the distinct values of a field across the documents matching a query.
#[derive(Clone, Debug)]
pub struct Distinct {
    inner: CommandOperation,
    coll: String,
    field_name: String,
    query: Document,
}

impl Distinct {
    /// Creates a `distinct` operation over `field_name` in the parent collection, filtered by
    /// `query`.
    pub fn new(
        parent: &dyn OperationParent,
        field_name: impl Into<String>,
        query: Document,
        options: Option<CommandOptions>,
    ) -> Result<Self> {
        Ok(Self {
            coll: parent.namespace().coll.clone(),
            inner: CommandOperation::new(Aspects::EXPLAINABLE, Some(parent), options)?,
            field_name: field_name.into(),
            query,
        })
    }

    /// The command operation this kind is built on.
    pub fn operation(&self) -> &CommandOperation {
        &self.inner
    }

    fn build(&self) -> Document {
        doc! {
            "distinct": self.coll.clone(),
            "key": self.field_name.clone(),
            "query": self.query.clone(),
        }
    }

    /// Executes the operation, resolving with the distinct values found.
    pub async fn execute<T: Transport + ?Sized>(
        &self,
        transport: &T,
        session: Option<&ClientSession>,
    ) -> Result<Vec<Bson>> {
        let reply = self
            .inner
            .execute_command(transport, session, &self.build())
            .await?;
        let response: Response = bson::from_document(reply)?;
        Ok(response.values)
    }

    /// Executes the operation, resolving with the server's reply verbatim. This is the form
    /// to use when an explain directive is active or a full response was requested, since the
    /// reply then carries no `values` payload to extract.
    pub async fn execute_raw<T: Transport + ?Sized>(
        &self,
        transport: &T,
        session: Option<&ClientSession>,
    ) -> Result<Document> {
        self.inner
            .execute_command(transport, session, &self.build())
            .await
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    values: Vec<Bson>,
}
