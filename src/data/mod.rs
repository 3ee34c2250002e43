pub mod dataset;
pub mod loader;
pub mod split;
pub mod synthetic;

pub use dataset::Dataset;
pub use loader::{Batch, DataLoader};
pub use split::{split_three_way, train_test_split, SplitConfig, Splits};
pub use synthetic::{make_classification, ClassificationConfig};
