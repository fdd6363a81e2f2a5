//! Decoding for JT/T 809 platform interconnection frames.
//!
//! A frame is de-stuffed and checksummed once with
//! [protocol::destuff::decode] (or [protocol::destuff::full_decode] for
//! fragments without a checksum), and then read field by field with a
//! [MessageReader].

mod error;
pub use error::{Error, Result};

pub mod protocol;

mod reader;
pub use reader::*;
