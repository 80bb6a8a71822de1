pub mod fetch;
pub mod import;
