//! MAC 层事件
//!
//! 每个事件只负责取出 `WlanWorld` 并转交给 `dcf.rs` 中对应的处理函数。

use super::id::NodeId;
use super::wlan_world::wlan_world;
use crate::error::Result;
use crate::sim::{Event, Simulator, World};

/// 事件：节点退避计数的一个 slot 边界
#[derive(Debug)]
pub struct BackoffSlot {
    pub node: NodeId,
}

impl Event for BackoffSlot {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        let BackoffSlot { node } = *self;
        wlan_world(world)?.on_backoff_slot(node, sim)
    }
}

/// 事件：数据帧在空口上发送完毕
#[derive(Debug)]
pub struct TxEnd {
    pub node: NodeId,
    pub tx_id: u64,
}

impl Event for TxEnd {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        let TxEnd { node, tx_id } = *self;
        wlan_world(world)?.on_tx_end(node, tx_id, sim)
    }
}

/// 事件：发送方得知本次尝试的结果（收到 ACK 或 ACK 超时）
#[derive(Debug)]
pub struct AckOutcome {
    pub node: NodeId,
    pub success: bool,
}

impl Event for AckOutcome {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        let AckOutcome { node, success } = *self;
        wlan_world(world)?.on_ack_outcome(node, success, sim)
    }
}

/// 事件：介质可能恢复空闲，唤醒冻结的退避
#[derive(Debug)]
pub struct MediumCheck;

impl Event for MediumCheck {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        wlan_world(world)?.on_medium_check(sim)
    }
}
