mod activity;
mod money;
mod rate;
mod summary;
mod transaction;

pub use activity::*;
pub use money::*;
pub use rate::*;
pub use summary::*;
pub use transaction::*;
