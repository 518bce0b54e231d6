pub mod history;
pub mod import;
pub mod settings;
