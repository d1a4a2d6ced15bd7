pub(crate) mod feather;
pub(crate) mod signal;
