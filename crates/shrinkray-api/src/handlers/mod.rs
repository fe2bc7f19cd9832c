pub mod health;
pub mod subscribe;
pub mod upload;
