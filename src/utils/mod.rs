pub mod clipboard;
pub mod filters;
