#![crate_type = "lib"]
#![crate_name = "bkmr_ingest"]

//! `bkmr-ingest`: a bookmark manager whose core is a concurrent,
//! resumable bulk-import pipeline (see `ingestion`). The row-level CLI
//! commands are thin glue over `application` and `domain::repositories`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod export;
pub mod fetch;
pub mod infrastructure;
pub mod ingestion;
pub mod parsers;
pub mod publish;
