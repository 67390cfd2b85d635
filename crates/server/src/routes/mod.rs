pub mod auth;
pub mod execute;
pub mod projects;
