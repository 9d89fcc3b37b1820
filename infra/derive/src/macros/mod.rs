pub mod error;
pub mod family;
mod fields;
pub mod variant;
