//! Integration tests for the hy codec

mod analysis;
mod filesystem_roundtrip;
mod test_utils;
