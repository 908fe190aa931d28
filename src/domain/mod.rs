mod classify;
mod ledger;
mod money;
mod transaction;

pub use classify::*;
pub use ledger::*;
pub use money::*;
pub use transaction::*;
