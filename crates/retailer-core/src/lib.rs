pub mod error;
pub mod export;
pub mod ingestion;
pub mod settings;
pub mod timestamp;
pub mod workbook;
