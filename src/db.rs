pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod table_repo;
pub use table_repo::TableRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
