pub mod auth;
pub mod cse;
pub mod customer;
pub mod delivery;
pub mod home;
pub mod manager;
pub mod subscription;
