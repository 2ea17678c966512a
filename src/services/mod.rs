//! Service layer: the balanced-sampling core and its sibling loaders.

pub mod accumulator;
pub mod completion;
pub mod filter_loader;
pub mod finalizer;
pub mod reporter;
pub mod sampler;

pub use accumulator::CategoryAccumulator;
pub use completion::CompletionDetector;
pub use filter_loader::{FilterOutcome, FilteredLoader};
pub use finalizer::finalize;
pub use reporter::{summarize, BalanceReport};
pub use sampler::{BalancedSampler, RunOutcome};
