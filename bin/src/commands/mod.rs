//! CLI command implementations.

pub(crate) mod candles;
pub(crate) mod intervals;
pub(crate) mod login;
pub(crate) mod profile;
