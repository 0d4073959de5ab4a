// Command handlers module
pub mod build;
pub mod delete;
pub mod import;
pub mod library;
pub mod settings;
pub mod verify;
