pub mod clock;
pub mod error;
pub mod rates;
pub mod report;
pub mod sampler;
pub mod scheduler;
pub mod sensors;
pub mod store;
