//! Pipeline stages implemented as actix `Transform`s.

pub mod boundary;
pub mod logger;

pub use boundary::ErrorBoundary;
pub use logger::RequestLogger;
