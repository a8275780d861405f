mod value;

pub use value::{Map, Number, Value};
