pub(crate) mod blend;
pub(crate) mod edge_detect;
pub(crate) mod globals;
pub(crate) mod program;
