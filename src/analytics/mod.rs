//! Analytics: trend aggregation, snapshot fetching and the activity log.

pub mod activity;
pub mod range;
pub mod snapshot;
pub mod trend;
