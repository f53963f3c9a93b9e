// src/pipeline/mod.rs

pub mod event_bus;
pub mod metrics;
pub mod session;

pub use event_bus::{EventBus, GestureEvent};
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use session::{SessionContext, SessionRegistry};
