//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and repository calls into import/export use-cases.
//! - Keep UI and CLI callers decoupled from storage details.

pub mod gedcom_service;
