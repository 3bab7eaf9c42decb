//! The minimal session surface consumed by command operations.

/// A session for a sequence of related operations. Owned by the caller; command operations
/// only consult whether a multi-statement transaction is currently active, and never retain
/// the session past a single call.
#[derive(Debug, Default)]
pub struct ClientSession {
    pub(crate) transaction: Transaction,
}

/// A struct modeling a transaction.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    pub(crate) state: TransactionState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum TransactionState {
    #[default]
    None,
    Starting,
    InProgress,
    Committed,
    Aborted,
}

impl ClientSession {
    /// Creates a session with no transaction in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a multi-statement transaction is currently active on this session.
    pub fn in_transaction(&self) -> bool {
        matches!(
            self.transaction.state,
            TransactionState::Starting | TransactionState::InProgress
        )
    }

    /// Marks the start of a transaction on this session. Sending the corresponding
    /// `startTransaction` wire command is the session owner's responsibility; operations in
    /// this crate only consult the state.
    pub fn start_transaction(&mut self) {
        self.transaction.state = TransactionState::Starting;
    }

    /// Marks the session's active transaction as committed.
    pub fn commit_transaction(&mut self) {
        self.transaction.state = TransactionState::Committed;
    }

    /// Marks the session's active transaction as aborted.
    pub fn abort_transaction(&mut self) {
        self.transaction.state = TransactionState::Aborted;
    }
}
