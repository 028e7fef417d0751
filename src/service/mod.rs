pub mod accounts;
pub mod assets;
pub mod auth;
pub mod config;
pub mod faqs;
pub mod google;
pub mod leads;
pub mod passwords;
pub mod products;
pub mod tokens;
