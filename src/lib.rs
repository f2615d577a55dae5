pub mod error;
pub mod settings;
pub mod utils;
pub mod markup;
pub mod classification;
pub mod remote_client;
pub mod tools;
pub mod store;
pub mod papers;
pub mod harvest;
pub mod corpus;

pub use error::{Error, Result};
