pub mod cleanup;
pub mod output;

pub use cleanup::{reconcile_signed, CleanupReport};
pub use output::{ensure_directory, list_pdf_names, remove_if_exists, OutputLock};
