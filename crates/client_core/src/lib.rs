pub mod dispatcher;
pub mod grid;
pub mod points;
pub mod robots;
pub mod session;

pub use dispatcher::{ChannelEvent, ChannelState, ChannelTransport, CommandDispatcher};
pub use grid::{GridObjectStore, GridSnapshot};
pub use points::PointRegistry;
pub use robots::RobotFeed;
pub use session::{SessionEvent, SessionOptions, SessionSummary, ViewUpdate, WarehouseSession};
