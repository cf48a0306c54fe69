//! Mental metrics: samples, the bounded history window and the poller.

mod history;
mod poller;
mod sample;

pub use history::{MetricHistory, DEFAULT_HISTORY_CAP};
pub use poller::{MetricsPoller, MetricsSource, PollerStatus, DEFAULT_POLL_INTERVAL, HISTORY_CACHE_KEY};
pub use sample::{MetricReading, MetricSample};
