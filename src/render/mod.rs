pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod stack;
pub(crate) mod surface;
pub(crate) mod text;
