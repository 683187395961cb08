//! Core types and trait definitions for the Karir alumni employment service.
//!
//! This crate is free of HTTP and database dependencies. It owns the domain
//! model, the [`store::CareerStore`] abstraction, the ownership resolver and
//! the trash/restore [`lifecycle::LifecycleEngine`].

pub mod access;
pub mod account;
pub mod alumni;
pub mod employment;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod query;
pub mod store;

pub use error::{Error, Result};
