pub mod gradebook_file;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

pub use gradebook_file::GradebookFile;
