//! Extension-author surface.
//!
//! `Model` and `Record` keep some internals crate-private so application code
//! cannot misuse them. Code that extends the library (serializers, caches,
//! custom persistence) reaches those internals through `access`.

pub mod access;
