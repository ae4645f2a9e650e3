// Domain models: run requests and progress snapshots

mod progress;
mod request;

pub use progress::{RunProgress, RunState};
pub use request::{GenerationMode, RunRequest, SizeUnit};
