use super::snapshot::ReceivedSnapshot;

/// 订阅线程向各监听者广播的事件
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Snapshot(ReceivedSnapshot),
    /// 数据源可达但没有值
    DataNotFound,
    /// 传输层错误，订阅随之结束
    ConnectionLost(String),
}
