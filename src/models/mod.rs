pub mod generator;
pub mod recorder;

pub use generator::PeriodicGenerator;
pub use recorder::{Sample, SampleRecorder, SampleSink};
