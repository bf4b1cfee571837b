//! # httpdigest
//!
//! `httpdigest` provides the building blocks for the HTTP `Digest` header of
//! RFC 3230: the closed set of supported algorithms, incremental accumulator
//! contexts, typed digest values, and the header value codec. It is HTTP-stack
//! agnostic; the companion `httpdigest-tower` crate wires these blocks into
//! tower middleware over streaming bodies.

mod algorithm;
mod checksum;
mod error;
pub mod header;
mod trace;
mod value;

pub mod prelude {
  pub use crate::{
    algorithm::{DigestAlgorithm, DigestContext},
    error::{DigestError, DigestResult},
    header::{self, DigestHeaderEntry},
    value::DigestValue,
  };
}

/* ----------------------------------------------------------------- */
