mod cors;

pub use cors::*;
