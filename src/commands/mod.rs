pub mod environment;
pub mod garden;
pub mod growth_log;
pub mod pod;
pub mod reminder;
pub mod seed;
pub mod seed_batch;
pub mod system;
pub mod task;
