// Declare the feature-gated module folders
#[cfg(feature = "loggers")]
pub mod loggers; // Structured local logging (Logrecord and LoggerLocal)
#[cfg(feature = "retrieve")]
pub mod retrieve; // HTTP retrieval with cache bypass and transient retries
#[cfg(feature = "roster")]
pub mod roster; // Roster records and pure normalization policies
#[cfg(feature = "sync")]
pub mod sync; // Refresh trigger and per-instance synchronization workers
#[cfg(feature = "utils")]
pub mod utils; // Time and process/system info helpers

// Re-export the most commonly used items
#[cfg(feature = "loggers")]
pub use loggers::loggerlocal::*;
#[cfg(feature = "loggers")]
pub use loggers::logrecord::*;
#[cfg(feature = "utils")]
pub use utils::misc::sys_info::*;
#[cfg(feature = "utils")]
pub use utils::misc::utils::*;
