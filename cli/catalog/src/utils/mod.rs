pub mod dialog;
pub mod errors;
pub mod init;
pub mod message;
pub mod render;
