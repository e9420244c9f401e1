pub mod aletheia;
pub mod currency_api;
