pub mod auth;
pub mod dashboard;
pub mod deals;
pub mod leads;
pub mod reports;
pub mod system;
