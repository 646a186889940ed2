pub mod history;
pub mod live_feed;

pub use history::HistoryHandler;
pub use live_feed::LiveFeedHandler;
