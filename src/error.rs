//! 错误类型
//!
//! 仿真核心与外围（配置/输出）共用的错误枚举。

use crate::sim::SimTime;
use crate::wifi::NodeId;

/// 仿真错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 配置非法（在仿真开始前检测）
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// 尝试在当前时钟之前调度事件
    #[error("causality violation: event scheduled at {at:?} but clock is already at {now:?}")]
    Causality { now: SimTime, at: SimTime },

    /// 节点被重复放置
    #[error("node {0:?} has already been placed")]
    DuplicatePlacement(NodeId),

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// 没有可参与统计的 flow
    #[error("no eligible flows to aggregate")]
    NoFlows,

    /// 事件执行时拿到的世界类型不是 `WlanWorld`
    #[error("world must be WlanWorld")]
    WorldMismatch,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
