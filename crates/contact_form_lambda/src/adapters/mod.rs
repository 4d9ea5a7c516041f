pub mod invoke;
pub mod secrets;
