// src/infrastructure/mod.rs
//! Concrete adapters for the domain's repository contract: a
//! `diesel`/SQLite-backed store for production use and an in-memory fake
//! for tests.

pub mod repositories;
