//! Local Git repository inspection.
//!
//! The pipeline only needs the checked-out `HEAD` of the workspace: its
//! commit message seeds the snap message when no pull request title is
//! configured, and its branch name is the fallback lane branch.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use lanesync::local::{CommitSource, Git2CommitSource};
//!
//! let source = Git2CommitSource::new(Utf8Path::new("."));
//! match source.head() {
//!     Ok(head) => println!("HEAD: {}", head.summary().unwrap_or("<empty>")),
//!     Err(e) => eprintln!("Inspection failed: {e}"),
//! }
//! ```

mod discovery;
mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use discovery::{CommitSource, Git2CommitSource, HeadCommit};
pub use error::LocalRepositoryError;
