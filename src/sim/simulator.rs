//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::{EventId, ScheduledEvent};
use super::time::SimTime;
use super::world::World;
use crate::error::{Error, Result};
use std::collections::{BinaryHeap, HashSet};
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
///
/// 同一时刻的事件严格按调度顺序（FIFO）执行。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    /// 尚未执行且未被取消的事件序列号
    pending: HashSet<u64>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 尚未执行的事件数（不含已取消的）
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// 调度事件在指定时间执行
    ///
    /// `at` 早于当前时间时返回 [`Error::Causality`]。
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> Result<EventId> {
        if at < self.now {
            return Err(Error::Causality { now: self.now, at });
        }

        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
        self.pending.insert(seq);

        debug!(queue_size = self.q.len(), "事件已加入队列");
        Ok(EventId(seq))
    }

    /// 在 `now + delay` 调度事件
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) -> Result<EventId> {
        self.schedule(self.now.saturating_add(delay), ev)
    }

    /// 取消一个尚未执行的事件。
    ///
    /// 返回是否真的取消了；对已执行/已取消的事件是 no-op。
    pub fn cancel(&mut self, id: EventId) -> bool {
        let removed = self.pending.remove(&id.0);
        trace!(seq = id.0, removed, "取消事件");
        removed
    }

    /// 事件是否仍在等待执行
    pub fn is_pending(&self, id: EventId) -> bool {
        self.pending.contains(&id.0)
    }

    /// 运行直到事件队列为空或到达 `until`。
    ///
    /// 恰好在 `until` 的事件也会执行；结束后时钟至少推进到 `until`。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> Result<()> {
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else {
                break;
            };
            if !self.pending.remove(&item.seq) {
                trace!(seq = item.seq, "跳过已取消事件");
                continue;
            }
            self.now = item.at;
            item.ev.execute(self, world)?;
            world.on_tick(self);
        }
        self.now = self.now.max(until);
        Ok(())
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) -> Result<()> {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut event_count = 0;
        while let Some(item) = self.q.pop() {
            if !self.pending.remove(&item.seq) {
                trace!(seq = item.seq, "跳过已取消事件");
                continue;
            }
            event_count += 1;
            self.now = item.at;

            debug!(
                event_num = event_count,
                now = ?self.now,
                scheduled_at = ?item.at,
                seq = item.seq,
                remaining_queue = self.q.len(),
                "执行事件"
            );

            item.ev.execute(self, world)?;
            world.on_tick(self);
        }

        info!(
            total_events = event_count,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
        Ok(())
    }
}
