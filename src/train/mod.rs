pub mod backend;
pub mod epoch_stats;
pub mod fit;
pub mod manual;
pub mod metrics;

pub use backend::Backend;
pub use epoch_stats::{EpochStats, History, save_histories, load_histories};
pub use fit::{FitConfig, Sequential};
pub use manual::train_manual;
pub use metrics::{evaluate, Metrics};
