pub mod catalog;
pub mod portfolio;
pub mod user;
