pub mod faqs;
pub mod leads;
pub mod products;
pub mod users;
