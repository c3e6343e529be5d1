//! Invoice field extraction module.

pub mod llm;
mod parser;
pub mod rules;

pub use parser::{extract_invoice_data, ExtractionResult, InvoiceFieldParser, InvoiceParser};
