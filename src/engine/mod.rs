pub mod curriculum;
pub mod filter;
pub mod lesson;
pub mod scoring;

pub use curriculum::{Curriculum, KeyStage};
pub use filter::{KeyFilter, WordQuery};
pub use lesson::{GeneratedLesson, LessonAssembler, LessonConfig, LessonError};
