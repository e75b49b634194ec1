//! Broadcast scheduling

mod scheduler;

pub use scheduler::ResultsScheduler;
