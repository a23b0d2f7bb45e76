pub mod detect;
pub mod layout;
pub mod mapper;
pub mod registry;

pub use detect::{DetectionConfig, DetectionResult, LayoutDetector};
pub use layout::{LayoutDescriptor, LayoutFamily, Region};
pub use mapper::{CharacterMapper, CharacterMapping};
pub use registry::{LayoutError, LayoutRegistry};
