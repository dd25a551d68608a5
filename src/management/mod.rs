mod ledger;
mod session;

pub use ledger::LedgerError;
pub use ledger::PostLedger;
pub use session::SessionManager;
