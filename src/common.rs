pub mod date_utils;
pub mod error;
pub mod filter_utils;
pub mod formatters;
pub mod i18n;
pub mod validators;
