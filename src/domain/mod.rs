// Price bar model
pub mod market;

// Feature schema, scaler and prediction types
pub mod ml;

// Port interfaces
pub mod ports;

// Bar consistency checks
pub mod validation;

// Domain-specific error types
pub mod errors;
