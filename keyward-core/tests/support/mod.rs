pub mod constants;
pub mod registry;
