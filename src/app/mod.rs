pub mod filter;
pub mod nav;
pub mod split;
mod state;

pub use state::{
    App, AppPaths, Executor, HomeTab, HostFactory, InputMode, Notice, NoticeLevel, OverlayData,
    Pane, Screen, TreeRow,
};
