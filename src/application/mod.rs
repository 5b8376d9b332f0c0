// Application layer - the ledger store and the rate updater.
// Clients (the CLI, tests) construct one store at startup and pass it around
// by reference; nothing here is global.

pub mod error;
mod rate_updater;
mod store;

pub use error::*;
pub use rate_updater::*;
pub use store::*;
