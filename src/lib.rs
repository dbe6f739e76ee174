pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod render;
pub mod schema;
pub mod session;
pub mod view;

pub use dataset::{ComplaintRecord, Dataset};
pub use error::{DashboardError, Result};
pub use filter::{filter, FilterSelection, Selection};
pub use session::Session;
pub use view::{compute_view, DashboardView, SummaryView, ViewModel};
