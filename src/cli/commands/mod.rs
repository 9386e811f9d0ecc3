pub mod auth;
pub mod invite;
pub mod org;
pub mod outline;
pub mod team;
