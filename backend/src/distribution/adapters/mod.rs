//! Concrete distributor adapters.
//!
//! One module per delivery strategy: [`tunecore`] submits through a partner
//! API, [`cdbaby`] stages packages and pushes them over the delivery
//! transport.

pub mod cdbaby;
pub mod tunecore;

pub use cdbaby::CdBabyAdapter;
pub use tunecore::TuneCoreAdapter;
