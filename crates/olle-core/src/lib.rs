//! Core types and services for study-group account settings.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::AccountStore`]; front ends drive the
//! [`settings::SettingsService`] and [`association::AssociationManager`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod association;
pub mod error;
pub mod form;
pub mod password;
pub mod settings;
pub mod store;
pub mod tag;
pub mod validate;
pub mod zone;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
