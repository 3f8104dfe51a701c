pub mod application_filters;
pub mod application_service;
pub use application_service::ApplicationService;
pub mod account_service;
pub use account_service::AccountService;
pub mod auth;
pub use auth::AuthService;
pub mod exclusion_service;
pub use exclusion_service::ExclusionService;
pub mod calendar_service;
pub use calendar_service::CalendarService;
pub mod order_service;
pub use order_service::OrderService;
