pub mod audio;
pub mod driver;
pub mod engine;
pub mod error;
pub mod report;

pub use engine::{AnalysisResult, AnalysisSession, Frame, SessionConfig};
pub use error::{AnalysisError, Result};
