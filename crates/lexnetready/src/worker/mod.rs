pub mod run;

pub use run::{spawn_run, RunHandle, RunOutput};
