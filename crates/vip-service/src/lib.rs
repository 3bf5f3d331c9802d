//! # vip-service
//!
//! Application layer: the admission controller, the lifecycle checkpoint
//! scheduler, the reporting aggregator, and admin command handling, all
//! wired through a shared [`services::ServiceContext`].

pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use services::{
    AdminCommands, AdmissionController, EventRouter, GateSettings, LifecycleScheduler,
    ReportingAggregator, ServiceContext, ServiceError, ServiceResult,
};
