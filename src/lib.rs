pub mod common;
pub mod test_utils;
