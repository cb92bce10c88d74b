pub mod cors;

pub use cors::credentialed_cors;
