pub mod monitor_scheduler;

pub use monitor_scheduler::{MonitorScheduler, MonitorSchedulerConfig, MonitorSchedulerHandle};
