//! Authoring model: typed, append-only records built by user calls or
//! loaded from `vizdeck.toml`.
//!
//! ```ignore
//! let project = ProjectSpec::new("Sales")
//!     .data("sales", table)?
//!     .page(
//!         PageSpec::new("Overview")
//!             .add(ContentItem::input(InputSpec::new(Widget::Select, "region", "Region").data("sales"))?)
//!             .add(ContentItem::chart(ChartSpec::new(ChartKind::Bar).data("sales").x("month").y("revenue"))?
//!                 .tabgroup("Sales/Monthly")?
//!                 .filter_by("region")),
//!     );
//! ```

mod block;
mod data;
mod filter;
mod page;
mod path;
mod project;

pub use block::{
    Agg, Aggregate, Backend, BlockSpec, ChartKind, ChartSpec, ContentItem, InputMode, InputSpec,
    MetricSpec, MetricValue, TableSpec, TextSpec, TextStyle, Widget,
};
pub use data::{DataProvider, DataRef, DataSources, Table};
pub use filter::{Operator, ShowWhen};
pub use page::{PageSpec, Placement};
pub use path::{PATH_SEPARATOR, TabPath};
pub use project::{NavStyle, ProjectSpec};
