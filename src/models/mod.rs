pub mod envelope;
pub mod portfolio;
