pub mod cookies;
pub mod crypto;
pub mod token;
pub mod validation;
