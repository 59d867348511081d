pub mod agent;
pub mod application;
pub mod bank;
pub mod customer;
pub mod notification;
