//! Parsers for the external sources leads are imported from.

pub mod csv;
