pub mod account;
pub mod application;
pub mod auth;
pub mod calendar;
pub mod exclusion;
pub mod order;
pub mod schedule;
