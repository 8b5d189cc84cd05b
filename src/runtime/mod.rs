//! Runtime half: the routine injected calls invoke on every re-execution

pub mod arguments;
pub mod host;
pub mod settings;
pub mod sink;
pub mod tracker;
pub mod value;

pub use arguments::{Arguments, EMPTY_ARGUMENTS};
pub use host::{recomposition_tracker, CompositionHost};
pub use settings::TrackingSettings;
pub use sink::{ConsoleSink, LogCrateSink, LogLevel, LogRecord, LogSink, MemorySink, LOGGER_TAG};
pub use tracker::{ArgumentChange, Phase, Recomposition, TrackerInstance, TrackerState};
pub use value::{
    Capture, CaptureDebug, CaptureOpaque, CapturedValue, Reactive, State, NULL_HASH, NULL_LITERAL,
};
