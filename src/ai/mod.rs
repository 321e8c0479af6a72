pub mod chat;
pub mod provider;
pub mod session;
