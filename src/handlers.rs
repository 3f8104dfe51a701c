pub mod accounts;
pub mod applications;
pub mod auth;
pub mod calendar;
pub mod exclusions;
pub mod orders;
