mod error;
mod proj;
mod transformer;

pub use error::ProjError;
pub use proj::ProjTransformer;
pub use transformer::{
    EpsgCode, PointTransformer, TransformDirection, EPSG_WGS84_GEOGRAPHIC,
};
