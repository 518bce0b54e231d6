pub mod api;
pub mod crypto;
pub mod duplicates;
pub mod executor;
pub mod header_map;
pub mod normalizer;
pub mod processor;
pub mod records;
pub mod session;
pub mod spreadsheet;
pub mod state;
pub mod tabular;
pub mod template;
pub mod watcher;
