#[allow(clippy::module_inception)]
pub mod ledger;
pub mod scenario;
