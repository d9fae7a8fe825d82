pub mod linalg;
pub mod math;
pub mod metrics;
