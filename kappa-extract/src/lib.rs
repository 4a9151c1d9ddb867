pub mod error;
pub mod images;
pub mod layout;
pub mod lidar;
pub mod trajectory;

pub use error::ExtractError;
pub use layout::ExtractLayout;
pub use trajectory::TrajectoryIndex;
