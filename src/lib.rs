//! # Sweeper
//!
//! A tool for sweeping directory trees: list, archive or delete matching files.
//!
//! This crate walks a directory tree, applies a filter (extension and minimum
//! size) to every file, and runs the configured actions on each match:
//! listing the path, compressing it into a mirrored archive tree, deleting it
//! with an audit record, or archive-then-delete in one pass.
//!
//! ## Usage
//!
//! ### Command Line
//!
//! ```bash
//! # List all .log files of at least 10 bytes under the current directory
//! sweeper --list --ext .log --size 10
//!
//! # Archive matches into /backup, then delete the originals
//! sweeper /var/data --ext .log --archive /backup --del --yes
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use sweeper_core::{ActionConfig, ActionDispatcher, FilterCriteria, TreeWalker, WalkConfig};
//!
//! let criteria = FilterCriteria::new(Some(".log".to_string()), 10);
//! let actions = ActionConfig { list: true, ..Default::default() };
//!
//! let mut dispatcher = ActionDispatcher::new(actions, ".", Vec::new(), Vec::new());
//! let walker = TreeWalker::new(WalkConfig::default());
//! let summary = walker.walk(".", &criteria, &mut dispatcher)?;
//! let (listing, _audit) = dispatcher.finish()?;
//! # let _ = (summary, listing);
//! # Ok::<(), sweeper_core::Error>(())
//! ```

// Re-export core functionality
pub use sweeper_core::*;

// Re-export commonly used types
pub use sweeper_core::{
    ActionConfig, ActionDispatcher, FilterCriteria, RunSummary, TreeWalker, WalkConfig,
};
