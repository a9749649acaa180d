pub mod loader;
pub mod types;
pub mod validator;
