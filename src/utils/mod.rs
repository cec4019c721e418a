pub mod error;
pub mod logger;
pub mod observer;
pub mod validation;
