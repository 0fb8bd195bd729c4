pub mod codec;
pub mod core_api;
pub mod karma;
pub mod layout;
pub mod party;
pub mod save;
pub mod sex;
pub mod types;
