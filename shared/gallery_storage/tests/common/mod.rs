// Not every utils is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

mod s3_utils;
pub use s3_utils::*;
