pub mod definitions;
pub mod normalization;
pub mod validation;

pub use definitions::UniqueField;
pub use normalization::Rejection;
pub use validation::{duplicate_diagnostic, EntityValidator};
