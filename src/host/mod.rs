pub(crate) mod orbit;
pub(crate) mod runner;
pub(crate) mod world;
