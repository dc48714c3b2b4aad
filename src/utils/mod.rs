pub mod id_generator;
pub mod url_validator;

pub use id_generator::{SHORT_ID_LEN, generate_id, is_valid_id};
pub use url_validator::validate_url;
