//! 标识符类型
//!
//! 定义节点、flow 和应用的唯一标识符（均为 arena 下标或单调编号）。

/// 节点标识符（`WlanWorld::nodes` 下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub usize);

/// Flow 标识符（由 FlowMonitor 分配，从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct FlowId(pub u32);

/// 流量源应用标识符（`WlanWorld::apps` 下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppId(pub usize);
