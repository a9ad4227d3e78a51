//! 共享无线介质
//!
//! 记录正在进行的数据帧传输以及 ACK 交换占用的时段。所有在时间上重叠的传输都视为碰撞。

use super::id::NodeId;
use crate::sim::SimTime;
use tracing::debug;

/// 一次数据帧传输
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transmission {
    pub id: u64,
    pub sender: NodeId,
    pub start: SimTime,
    pub end: SimTime,
    pub collided: bool,
}

#[derive(Debug, Default)]
pub struct Medium {
    active: Vec<Transmission>,
    /// ACK 交换占用介质直到该时刻
    reserved_until: SimTime,
    next_tx_id: u64,
    collisions: u64,
}

impl Medium {
    /// 开始一次传输；与所有仍在进行的传输互相标记为碰撞
    pub fn begin(&mut self, sender: NodeId, start: SimTime, end: SimTime) -> u64 {
        let id = self.next_tx_id;
        self.next_tx_id = self.next_tx_id.wrapping_add(1);

        let mut collided = false;
        for tx in self.active.iter_mut().filter(|tx| tx.end > start) {
            if !tx.collided {
                self.collisions += 1;
            }
            tx.collided = true;
            collided = true;
        }
        if collided {
            self.collisions += 1;
            debug!(sender = ?sender, ?start, overlapping = self.active.len(), "💥 传输重叠，发生碰撞");
        }

        self.active.push(Transmission {
            id,
            sender,
            start,
            end,
            collided,
        });
        id
    }

    /// 结束一次传输并返回其记录
    pub fn finish(&mut self, tx_id: u64) -> Option<Transmission> {
        let idx = self.active.iter().position(|tx| tx.id == tx_id)?;
        Some(self.active.swap_remove(idx))
    }

    pub fn reserve_until(&mut self, until: SimTime) {
        self.reserved_until = self.reserved_until.max(until);
    }

    pub fn reserved_until(&self) -> SimTime {
        self.reserved_until
    }

    pub fn active(&self) -> &[Transmission] {
        &self.active
    }

    /// 介质在 `now` 是否完全空闲（不考虑传播时延）
    pub fn is_idle(&self, now: SimTime) -> bool {
        self.active.is_empty() && self.reserved_until <= now
    }

    /// 涉及碰撞的传输总数
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}
