//! 队列策略（Queue disciplines）
//!
//! MAC 发送队列。目前只有 DropTail（尾丢弃），容量按包数计。

use crate::wifi::Packet;

mod drop_tail;

pub use drop_tail::DropTailQueue;

/// 默认 MAC 队列容量（包）
pub const DEFAULT_QUEUE_PKTS: usize = 500;

/// Packet 队列抽象
pub trait PacketQueue: std::fmt::Debug + Send {
    /// 入队：成功返回 Ok；若被丢弃则返回 Err(pkt)
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 出队：按队列策略返回下一个 packet
    fn dequeue(&mut self) -> Option<Packet>;
    /// 查看下一个将要出队的 packet
    fn front(&self) -> Option<&Packet>;

    fn len(&self) -> usize;
    fn bytes(&self) -> u64;
    fn capacity_pkts(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
