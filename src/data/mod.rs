//! Data structures for qPCR analysis

mod measurement;
mod records;
mod validate;

pub use measurement::{is_valid_ct, Measurement, CT_CEILING};
pub use records::{DeltaCt, DeltaDeltaCt, ReplicateMean};
pub use validate::{validate_measurements, ValidationReport};
