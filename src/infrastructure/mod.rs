// Infrastructure module - Timers and background task bookkeeping
pub mod heartbeat;
pub mod task_manager;
pub mod timer;

pub use heartbeat::HeartbeatTimer;
pub use task_manager::TaskManager;
pub use timer::Timer;
