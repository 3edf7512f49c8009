pub mod display;
pub mod engine;
pub mod error;
pub mod input;

pub use display::split_for_display;
pub use engine::{DerivedOutput, current_year, derive, derive_for_year, extract, sha256_hex};
pub use error::DerivationError;
pub use input::{CapitalizationRule, DerivationInput, GenerationMode, ParseModeError};
