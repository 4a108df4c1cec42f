pub mod jobs;
pub mod scheduler;

pub use scheduler::{FlowOutcome, Scheduler, TickReport};
