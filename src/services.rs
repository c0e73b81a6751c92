pub mod auth;
pub mod catalog_service;
pub mod dashboard_service;
pub mod live;
pub mod order_service;
pub mod table_service;
