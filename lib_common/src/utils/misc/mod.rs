/// System and process information retrieval.
pub mod sys_info;
/// General helper functions for time formatting and display text.
pub mod utils;
