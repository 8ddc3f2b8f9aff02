//! State-machine host: serialized block execution and committed snapshots.

pub mod msg;
pub mod state;

pub use msg::{Msg, TxResult};
pub use state::{BlockOutcome, ChainState, Snapshot};
