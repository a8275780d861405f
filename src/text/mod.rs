pub(crate) mod number;
pub(crate) mod percent;
