use crate::bson::{Bson, Document};

/// The target of the tracing events emitted as commands are decorated and dispatched.
pub const COMMAND_TRACING_EVENT_TARGET: &str = "mongodb_command::command";

pub(crate) trait TracingRepresentation {
    type Representation;

    fn tracing_representation(&self) -> Self::Representation;
}

impl TracingRepresentation for Document {
    type Representation = String;

    fn tracing_representation(&self) -> String {
        Bson::Document(self.clone())
            .into_relaxed_extjson()
            .to_string()
    }
}
