pub mod panels;
pub mod svg;

pub use panels::panels_from_histories;
pub use svg::{render_loss_chart, write_loss_chart, ChartOptions, LineStyle, Panel, Series};
