//! Reconstruction core for admission seat-matrix tables.
//!
//! A PDF table extractor hands over rows with split college names, repeated
//! header blocks and loose seat cells. [`pipeline::SeatMatrixPipeline`] turns
//! them into one [`pipeline::ReconstructedRecord`] per valid serial number,
//! driven by the document-specific tables in [`rules::ReconstructionRules`].

pub mod config;
pub mod error;
pub mod pipeline;
pub mod rules;
pub mod telemetry;
