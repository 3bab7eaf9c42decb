//! Contains the options that can be set when constructing a command operation.

use std::time::Duration;

use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::{
    collation::Collation,
    concern::{ReadConcern, WriteConcern},
    explain::ExplainOption,
    serde_util,
};

/// Merges the options inherited from a parent entity into an options bag. Options already
/// present in the bag win over the parent's.
macro_rules! resolve_options {
    ($obj:expr, $opts:expr, [$( $field:ident ),+] ) => {
        $(
            if let Some(option) = $obj.$field() {
                if !$opts
                    .as_ref()
                    .map(|opts| opts.$field.is_some())
                    .unwrap_or(false)
                {
                    $opts.get_or_insert_with(Default::default).$field = Some(option.clone());
                }
            }
        )+
    };
}

pub(crate) use resolve_options;

/// The per-call options accepted when constructing a command operation.
///
/// The bag can be deserialized from a loosely-typed document, so callers holding
/// configuration as BSON can pass it through unchanged.
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct CommandOptions {
    /// The read concern to attach to the command, where its verb supports one.
    pub read_concern: Option<ReadConcern>,

    /// The write concern to attach to the command, for operation kinds that write.
    pub write_concern: Option<WriteConcern>,

    /// The collation the server should use for string comparisons. Requires a server with wire
    /// version 5 or newer; execution against an older server fails before anything is sent.
    pub collation: Option<Collation>,

    /// An arbitrary string comment attached to the command and surfaced in server logs and
    /// profiling output.
    pub comment: Option<String>,

    /// The advisory time limit the server applies to the command. Cancellation of an in-flight
    /// command is the transport's responsibility.
    #[serde(
        rename = "maxTimeMS",
        default,
        deserialize_with = "serde_util::deserialize_duration_option_from_u64_millis"
    )]
    pub max_time: Option<Duration>,

    /// Whether the operation may be retried by an outer retry layer.
    pub retry_writes: Option<bool>,

    /// Request the command's execution plan rather than its result. Only valid on explainable
    /// operation kinds; constructing any other kind with this option set is an error.
    pub explain: Option<ExplainOption>,

    /// Dispatch the command against this database instead of the one derived from the parent
    /// entity.
    pub db_name: Option<String>,

    /// Legacy alias for [`db_name`](CommandOptions::db_name), consulted only when `db_name` is
    /// unset.
    #[serde(rename = "authdb")]
    pub auth_db: Option<String>,

    /// Whether the caller wants the complete server reply rather than just the result payload.
    /// Defaults to false.
    pub full_response: Option<bool>,
}

impl CommandOptions {
    /// The database-name override in effect, if any.
    pub(crate) fn db_name_override(&self) -> Option<&str> {
        self.db_name.as_deref().or(self.auth_db.as_deref())
    }
}
