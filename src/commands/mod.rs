pub mod chat;
pub mod download;
pub mod toast;
pub mod upload;
