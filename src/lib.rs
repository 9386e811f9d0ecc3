pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod invitations;
pub mod notify;
pub mod outline;
pub mod store;
pub mod switcher;
pub mod team;
pub mod types;
pub mod view;
pub mod workspace;

pub use error::{ClientError, ClientResult};
pub use workspace::Workspace;
