//! Service layer modules

mod admin;
mod admission;
mod context;
mod error;
mod lifecycle;
mod reporting;
mod router;

pub use admin::AdminCommands;
pub use admission::AdmissionController;
pub use context::{GateSettings, ServiceContext};
pub use error::{ServiceError, ServiceResult};
pub use lifecycle::LifecycleScheduler;
pub use reporting::{FleetSummary, ReportingAggregator, REPORT_CURSOR_KEY};
pub use router::EventRouter;
