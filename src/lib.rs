pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod rates;
pub mod storage;

pub use application::LedgerStore;
pub use domain::*;
