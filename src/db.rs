pub mod store;
pub use store::{
    initialize_collections, CollectionStore, MemoryCollectionStore, PgCollectionStore, StorageKey,
};
pub mod collection;
pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod application_repo;
pub use application_repo::ApplicationRepository;
pub mod exclusion_repo;
pub use exclusion_repo::ExclusionRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
