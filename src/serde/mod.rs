mod de;
mod ser;

pub(crate) use de::from_value;
pub(crate) use ser::to_value;
