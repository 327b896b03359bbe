//! Deterministic source-to-destination schema translation.

pub mod states;
pub mod types;

pub use states::StateCrosswalk;
pub use types::{TypeCrosswalk, TypeMapping};
