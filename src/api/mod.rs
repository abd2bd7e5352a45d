pub mod computed;
pub mod format;
