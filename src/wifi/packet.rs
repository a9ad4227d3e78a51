//! 数据包类型
//!
//! 定义无线数据包（上层载荷，MAC 帧开销由 PHY 计算时另加）。

use super::id::{FlowId, NodeId};
use crate::sim::SimTime;

/// 无线数据包
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: u64,
    pub flow: FlowId,
    /// flow 内的序号，从 0 开始
    pub seq: u64,
    pub src: NodeId,
    pub dst: NodeId,
    pub size_bytes: u32,
    /// 应用层产生该包的时刻（用于计算端到端时延）
    pub created_at: SimTime,
}
