pub mod formatting;
pub mod test_utils;

pub use formatting::{format_amount, format_date, format_naive_date, format_time};
