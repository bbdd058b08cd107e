pub(crate) mod backend;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod encoding;
pub(crate) mod pool;
pub(crate) mod surface;
