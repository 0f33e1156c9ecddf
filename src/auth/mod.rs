pub(crate) mod extractors;

pub use extractors::{BasicCredentials, Credentials};
