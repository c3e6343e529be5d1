//! Core library for Austrian utility invoice processing.
//!
//! This crate provides:
//! - Rule-based field extraction from OCR text (address, Zählpunktnummer,
//!   current consumption in kWh)
//! - German-locale number normalization
//! - The record shared with an optional LLM-based extraction path, and the
//!   fallback resolution between the two paths
//!
//! The extraction engine is purely computational: it takes one UTF-8 text
//! blob produced by an external OCR or vision step and returns best-effort
//! values for the three fields. Input that contains no recognizable pattern
//! yields an all-absent record rather than an error.

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{Result, ZaehlwerkError};
pub use invoice::llm::{parse_llm_response, resolve_extraction};
pub use invoice::rules::{locate_address, locate_consumption_kwh, locate_meter_point_id};
pub use invoice::{extract_invoice_data, ExtractionResult, InvoiceFieldParser, InvoiceParser};
pub use models::config::ExtractionConfig;
pub use models::invoice::ExtractedInvoiceData;
