pub(crate) mod camera;
pub(crate) mod model;
pub(crate) mod raster;
