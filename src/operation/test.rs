use std::sync::Mutex;

use futures_core::future::BoxFuture;
use pretty_assertions::assert_eq;

use crate::{
    bson::{doc, to_vec, Bson, Document},
    concern::{ReadConcern, WriteConcern},
    error::Result,
    explain::{ExplainOption, ExplainVerbosity},
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
    options::CommandOptions,
    server::{ExecutionOptions, ServerDescription, Transport},
    session::ClientSession,
};

struct TestParent {
    ns: Namespace,
    read_concern: Option<ReadConcern>,
    write_concern: Option<WriteConcern>,
}

impl TestParent {
    fn new(db: &str, coll: &str) -> Self {
        Self {
            ns: Namespace::new(db, coll),
            read_concern: None,
            write_concern: None,
        }
    }
}

impl OperationParent for TestParent {
    fn namespace(&self) -> &Namespace {
        &self.ns
    }

    fn read_concern(&self) -> Option<&ReadConcern> {
        self.read_concern.as_ref()
    }

    fn write_concern(&self) -> Option<&WriteConcern> {
        self.write_concern.as_ref()
    }
}

/// A transport that records every dispatched command instead of talking to a server.
struct MockTransport {
    description: ServerDescription,
    reply: Document,
    sent: Mutex<Vec<(Namespace, Document, bool)>>,
}

impl MockTransport {
    fn with_wire_version(wire_version: i32) -> Self {
        Self {
            description: ServerDescription::new("localhost:27017", wire_version),
            reply: doc! { "ok": 1 },
            sent: Mutex::new(Vec::new()),
        }
    }

    fn with_reply(mut self, reply: Document) -> Self {
        self.reply = reply;
        self
    }

    fn sent(&self) -> Vec<(Namespace, Document, bool)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn description(&self) -> &ServerDescription {
        &self.description
    }

    fn send<'a>(
        &'a self,
        ns: &'a Namespace,
        command: Document,
        options: ExecutionOptions,
    ) -> BoxFuture<'a, Result<Document>> {
        self.sent
            .lock()
            .unwrap()
            .push((ns.clone(), command, options.full_response));
        let reply = self.reply.clone();
        Box::pin(async move { Ok(reply) })
    }
}

fn context(description: &ServerDescription) -> DecorationContext<'_> {
    DecorationContext {
        description,
        in_transaction: false,
    }
}

#[test]
fn namespace_precedence() {
    let parent = TestParent::new("app", "users");

    let op = CommandOperation::new(
        Aspects::empty(),
        Some(&parent),
        Some(CommandOptions::builder().db_name("other".to_string()).build()),
    )
    .unwrap();
    assert_eq!(op.namespace(), &Namespace::new("other", "$cmd"));

    let op = CommandOperation::new(
        Aspects::empty(),
        None,
        Some(CommandOptions::builder().auth_db("legacy".to_string()).build()),
    )
    .unwrap();
    assert_eq!(op.namespace(), &Namespace::new("legacy", "$cmd"));

    let op = CommandOperation::new(Aspects::empty(), Some(&parent), None).unwrap();
    assert_eq!(op.namespace(), &Namespace::new("app", "$cmd"));

    let op = CommandOperation::new(Aspects::empty(), None, None).unwrap();
    assert_eq!(op.namespace(), &Namespace::new("admin", "$cmd"));
}

#[tokio::test]
async fn collation_below_wire_version_5_fails_without_send() {
    let options = CommandOptions::builder()
        .collation(crate::collation::Collation::builder().locale("fr").build())
        .build();
    let op = CommandOperation::new(Aspects::empty(), None, Some(options)).unwrap();

    let transport = MockTransport::with_wire_version(4);
    let error = op
        .execute_command(&transport, None, &doc! { "find": "users" })
        .await
        .unwrap_err();

    assert!(error.is_incompatible_server());
    assert!(error.to_string().contains("wire version 4"));
    assert!(transport.sent().is_empty());
}

#[test]
fn collation_attached_at_wire_version_5() {
    let options = CommandOptions::builder()
        .collation(crate::collation::Collation::builder().locale("fr").build())
        .build();
    let op = CommandOperation::new(Aspects::empty(), None, Some(options)).unwrap();

    let description = ServerDescription::new("localhost:27017", 5);
    let decorated = op
        .decorate_command(&doc! { "find": "users" }, context(&description))
        .unwrap();

    assert_eq!(
        decorated.get_document("collation").unwrap(),
        &doc! { "locale": "fr" }
    );
}

#[test]
fn explain_rejected_on_non_explainable_kind() {
    let options = CommandOptions::builder()
        .explain(ExplainOption::Enabled(true))
        .build();
    let error = CommandOperation::new(Aspects::WRITE_OPERATION, None, Some(options)).unwrap_err();
    assert!(error.is_invalid_argument());
}

#[test]
fn explainable_kind_without_explain_option_adds_no_decoration() {
    let op = CommandOperation::new(Aspects::EXPLAINABLE, None, None).unwrap();
    assert!(op.explain().is_none());

    let description = ServerDescription::new("localhost:27017", 6);
    let cmd = doc! { "distinct": "users", "key": "city", "query": {} };
    assert_eq!(op.decorate_command(&cmd, context(&description)).unwrap(), cmd);
}

#[test]
fn retry_eligibility() {
    let op = CommandOperation::new(Aspects::EXPLAINABLE, None, None).unwrap();
    assert!(op.can_retry_write());

    let options = CommandOptions::builder()
        .explain(ExplainOption::Verbosity(ExplainVerbosity::QueryPlanner))
        .build();
    let op = CommandOperation::new(Aspects::EXPLAINABLE, None, Some(options)).unwrap();
    assert!(!op.can_retry_write());

    let op = CommandOperation::new(Aspects::WRITE_OPERATION, None, None).unwrap();
    assert!(op.can_retry_write());
}

#[test]
fn decoration_is_deterministic() {
    let options = CommandOptions::builder()
        .read_concern(ReadConcern::majority())
        .write_concern(WriteConcern::majority())
        .collation(crate::collation::Collation::builder().locale("en_US").build())
        .max_time(std::time::Duration::from_millis(500))
        .comment("nightly sweep".to_string())
        .build();
    let op = CommandOperation::new(Aspects::WRITE_OPERATION, None, Some(options)).unwrap();

    let description = ServerDescription::new("localhost:27017", 8);
    let cmd = doc! { "find": "users", "filter": { "active": true } };

    let first = op.decorate_command(&cmd, context(&description)).unwrap();
    let second = op.decorate_command(&cmd, context(&description)).unwrap();
    assert_eq!(to_vec(&first).unwrap(), to_vec(&second).unwrap());
}

#[tokio::test]
async fn transaction_suppresses_concerns() {
    let options = CommandOptions::builder()
        .read_concern(ReadConcern::majority())
        .write_concern(WriteConcern::majority())
        .build();
    let op = CommandOperation::new(Aspects::WRITE_OPERATION, None, Some(options)).unwrap();

    let transport = MockTransport::with_wire_version(8);
    op.execute_command(&transport, None, &doc! { "find": "users" })
        .await
        .unwrap();

    let mut session = ClientSession::new();
    session.start_transaction();
    op.execute_command(&transport, Some(&session), &doc! { "find": "users" })
        .await
        .unwrap();

    let sent = transport.sent();
    assert!(sent[0].1.contains_key("readConcern"));
    assert!(sent[0].1.contains_key("writeConcern"));
    assert!(!sent[1].1.contains_key("readConcern"));
    assert!(!sent[1].1.contains_key("writeConcern"));
}

#[test]
fn read_concern_only_attached_to_supporting_verbs() {
    let options = CommandOptions::builder()
        .read_concern(ReadConcern::local())
        .build();
    let op = CommandOperation::new(Aspects::empty(), None, Some(options)).unwrap();
    let description = ServerDescription::new("localhost:27017", 8);

    let decorated = op
        .decorate_command(&doc! { "distinct": "users", "key": "city" }, context(&description))
        .unwrap();
    assert_eq!(
        decorated.get_document("readConcern").unwrap(),
        &doc! { "level": "local" }
    );

    let decorated = op
        .decorate_command(&doc! { "shutdown": 1 }, context(&description))
        .unwrap();
    assert!(!decorated.contains_key("readConcern"));
}

#[test]
fn write_concern_omitted_below_wire_version_5() {
    let options = CommandOptions::builder()
        .write_concern(WriteConcern::majority())
        .build();
    let op = CommandOperation::new(Aspects::WRITE_OPERATION, None, Some(options)).unwrap();

    let description = ServerDescription::new("localhost:27017", 4);
    let decorated = op
        .decorate_command(&doc! { "drop": "users" }, context(&description))
        .unwrap();
    assert!(!decorated.contains_key("writeConcern"));
}

#[test]
fn legacy_aggregate_explain_uses_boolean_flag() {
    let options = CommandOptions::builder()
        .explain(ExplainOption::Verbosity(ExplainVerbosity::QueryPlanner))
        .build();
    let op = CommandOperation::new(Aspects::EXPLAINABLE, None, Some(options)).unwrap();
    let cmd = doc! { "aggregate": "users", "pipeline": [], "cursor": {} };

    let description = ServerDescription::new("localhost:27017", 5);
    let decorated = op.decorate_command(&cmd, context(&description)).unwrap();
    assert_eq!(decorated.get("aggregate"), Some(&Bson::String("users".to_string())));
    assert_eq!(decorated.get("explain"), Some(&Bson::Boolean(true)));

    let description = ServerDescription::new("localhost:27017", 6);
    let decorated = op.decorate_command(&cmd, context(&description)).unwrap();
    assert_eq!(decorated.get_document("explain").unwrap(), &cmd);
    assert_eq!(
        decorated.get_str("verbosity").unwrap(),
        "queryPlanner"
    );
}

#[test]
fn explain_decoration_preserves_already_wrapped_commands() {
    let options = CommandOptions::builder()
        .explain(ExplainOption::Verbosity(ExplainVerbosity::ExecutionStats))
        .build();
    let op = CommandOperation::new(Aspects::EXPLAINABLE, None, Some(options)).unwrap();

    let cmd = doc! { "explain": { "count": "users" }, "verbosity": "queryPlanner" };
    let description = ServerDescription::new("localhost:27017", 8);
    assert_eq!(op.decorate_command(&cmd, context(&description)).unwrap(), cmd);
}

#[test]
fn max_time_and_comment_attached() {
    let options = CommandOptions::builder()
        .max_time(std::time::Duration::from_secs(2))
        .comment("slow report".to_string())
        .build();
    let op = CommandOperation::new(Aspects::empty(), None, Some(options)).unwrap();

    let description = ServerDescription::new("localhost:27017", 8);
    let decorated = op
        .decorate_command(&doc! { "count": "users" }, context(&description))
        .unwrap();
    assert_eq!(decorated.get("maxTimeMS"), Some(&Bson::Int32(2000)));
    assert_eq!(decorated.get_str("comment").unwrap(), "slow report");
}

#[tokio::test]
async fn full_response_flag_forwarded_to_transport() {
    let options = CommandOptions::builder().full_response(true).build();
    let op = CommandOperation::new(Aspects::empty(), None, Some(options)).unwrap();

    let transport = MockTransport::with_wire_version(8);
    op.execute_command(&transport, None, &doc! { "ping": 1 })
        .await
        .unwrap();

    assert!(transport.sent()[0].2);
}

#[test]
fn run_command_rejects_empty_document() {
    let error = RunCommand::new(None, doc! {}, None).unwrap_err();
    assert!(error.is_invalid_argument());
}

#[tokio::test]
async fn distinct_parses_values() {
    let parent = TestParent::new("app", "users");
    let distinct = Distinct::new(&parent, "city", doc! { "active": true }, None).unwrap();

    let transport = MockTransport::with_wire_version(8)
        .with_reply(doc! { "ok": 1, "values": ["tokyo", "lyon"] });
    let values = distinct.execute(&transport, None).await.unwrap();
    assert_eq!(
        values,
        vec![
            Bson::String("tokyo".to_string()),
            Bson::String("lyon".to_string())
        ]
    );

    let sent = transport.sent();
    assert_eq!(sent[0].0, Namespace::new("app", "$cmd"));
    assert_eq!(sent[0].1.get_str("distinct").unwrap(), "users");
    assert_eq!(sent[0].1.get_str("key").unwrap(), "city");
}

#[tokio::test]
async fn drop_collection_inherits_parent_write_concern() {
    let mut parent = TestParent::new("app", "stale");
    parent.write_concern = Some(WriteConcern::nodes(2));

    let drop = DropCollection::new(&parent, None).unwrap();
    assert_eq!(drop.operation().write_concern(), Some(&WriteConcern::nodes(2)));

    let transport = MockTransport::with_wire_version(8);
    drop.execute(&transport, None).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].1.get_str("drop").unwrap(), "stale");
    assert_eq!(
        sent[0].1.get_document("writeConcern").unwrap(),
        &doc! { "w": 2_i32 }
    );
}

#[tokio::test]
async fn operation_options_override_parent_concerns() {
    let mut parent = TestParent::new("app", "users");
    parent.read_concern = Some(ReadConcern::local());

    let options = CommandOptions::builder()
        .read_concern(ReadConcern::majority())
        .build();
    let op = CommandOperation::new(Aspects::empty(), Some(&parent), Some(options)).unwrap();
    assert_eq!(op.read_concern(), Some(&ReadConcern::majority()));

    let op = CommandOperation::new(Aspects::empty(), Some(&parent), None).unwrap();
    assert_eq!(op.read_concern(), Some(&ReadConcern::local()));
}
