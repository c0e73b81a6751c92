pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod live;
pub mod orders;
pub mod pages;
pub mod tables;
