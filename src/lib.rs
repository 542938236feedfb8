pub mod analytics;
pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dimensions;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod records;
pub mod scheduler;

pub use analytics::{ServingSummary, summarize};
pub use builder::{build, build_all};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig};
pub use dimensions::DimensionTracker;
pub use engine::LayoutEngine;
pub use filter::FilterSet;
pub use ir::{Edge, GraphModel, GroupRecord, Node, NodeKind, Point, Size};
pub use layout::{LayoutResult, layout_initial, reflow, reflow_all};
pub use scheduler::{ReflowAction, ReflowEvent, ReflowScheduler};
