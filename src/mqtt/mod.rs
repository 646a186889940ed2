pub mod client;
pub mod payload;

pub use client::{FeedFanout, MqttSource, ReceiptClock, Subscription, SubscriptionError};
pub use payload::{decode_snapshot, PayloadError};
