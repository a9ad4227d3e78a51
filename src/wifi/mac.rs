//! DCF 竞争状态机（每个节点一份）
//!
//! 状态：`Idle → Backoff → Transmitting → WaitingAck → {Success | Collision}`。
//! 这里只维护单个节点的状态与竞争窗口；与共享介质、事件调度的交互见 `dcf.rs`。

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::id::NodeId;
use super::packet::Packet;
use crate::error::{Error, Result};
use crate::queue::{DEFAULT_QUEUE_PKTS, DropTailQueue, PacketQueue};
use crate::sim::EventId;

/// MAC 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MacConfig {
    pub cw_min: u32,
    pub cw_max: u32,
    /// 最大重传次数；超过后丢弃该包
    pub max_retries: u32,
    /// 发送队列容量（包）
    pub queue_limit: usize,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            cw_min: 31,
            cw_max: 1023,
            max_retries: 7,
            queue_limit: DEFAULT_QUEUE_PKTS,
        }
    }
}

impl MacConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cw_min > self.cw_max {
            return Err(Error::Configuration(format!(
                "cw_min ({}) must not exceed cw_max ({})",
                self.cw_min, self.cw_max
            )));
        }
        if self.queue_limit == 0 {
            return Err(Error::Configuration("mac queue limit must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacState {
    Idle,
    Backoff,
    Transmitting,
    WaitingAck,
    Success,
    Collision,
}

/// MAC 计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacCounters {
    /// 发起的传输次数（含重传）
    pub attempts: u64,
    pub successes: u64,
    /// 失败次数（碰撞或信号过弱）
    pub failures: u64,
    /// 超过重传上限被丢弃的包
    pub retry_drops: u64,
    /// 队列满被丢弃的包
    pub queue_drops: u64,
}

/// 一次失败之后的处理结果
#[derive(Debug)]
pub enum FailureOutcome {
    /// 还可以重传，回到 Backoff
    Retry,
    /// 超过重传上限，包被永久丢弃
    Dropped(Packet),
}

/// 单个节点的 MAC 实体
#[derive(Debug)]
pub struct Mac {
    node: NodeId,
    cfg: MacConfig,
    state: MacState,
    cw: u32,
    backoff_slots: u32,
    /// 介质忙导致退避计数冻结
    paused: bool,
    retries: u32,
    queue: Box<dyn PacketQueue>,
    /// 已调度但尚未执行的退避 slot 事件
    pub(crate) slot_event: Option<EventId>,
    pub counters: MacCounters,
}

impl Mac {
    pub fn new(node: NodeId, cfg: MacConfig) -> Self {
        let queue = Box::new(DropTailQueue::new(cfg.queue_limit));
        Self {
            node,
            cw: cfg.cw_min,
            cfg,
            state: MacState::Idle,
            backoff_slots: 0,
            paused: false,
            retries: 0,
            queue,
            slot_event: None,
            counters: MacCounters::default(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn state(&self) -> MacState {
        self.state
    }

    pub fn cw(&self) -> u32 {
        self.cw
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn backoff_slots(&self) -> u32 {
        self.backoff_slots
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn head(&self) -> Option<&Packet> {
        self.queue.front()
    }

    pub(crate) fn set_state(&mut self, state: MacState) {
        trace!(node = ?self.node, from = ?self.state, to = ?state, "MAC 状态迁移");
        self.state = state;
    }

    /// 包入队；队列满时原样返回
    pub fn enqueue(&mut self, pkt: Packet) -> std::result::Result<(), Packet> {
        match self.queue.enqueue(pkt) {
            Ok(()) => Ok(()),
            Err(pkt) => {
                self.counters.queue_drops += 1;
                debug!(node = ?self.node, pkt_id = pkt.id, "🗑️  MAC 队列已满，丢弃");
                Err(pkt)
            }
        }
    }

    /// 进入 Backoff：从 `[0, cw]` 均匀抽取退避 slot 数
    pub fn begin_backoff<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        self.backoff_slots = rng.random_range(0..=self.cw);
        self.paused = false;
        self.set_state(MacState::Backoff);
        debug!(node = ?self.node, cw = self.cw, slots = self.backoff_slots, "开始退避");
        self.backoff_slots
    }

    /// 一个空闲 slot：退避计数减一。返回是否已经到 0（可以发送）。
    pub(crate) fn idle_slot(&mut self) -> bool {
        if self.backoff_slots == 0 {
            return true;
        }
        self.backoff_slots -= 1;
        false
    }

    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    pub(crate) fn resume(&mut self) {
        self.paused = false;
    }

    pub(crate) fn start_attempt(&mut self) {
        self.counters.attempts += 1;
        self.set_state(MacState::Transmitting);
    }

    /// 收到 ACK：竞争窗口复位，头部包出队
    pub fn on_success(&mut self) -> Option<Packet> {
        self.set_state(MacState::Success);
        self.counters.successes += 1;
        self.cw = self.cfg.cw_min;
        self.retries = 0;
        self.queue.dequeue()
    }

    /// 未收到 ACK：竞争窗口翻倍（封顶），重传计数加一，超限丢包
    pub fn on_failure(&mut self) -> FailureOutcome {
        self.set_state(MacState::Collision);
        self.counters.failures += 1;
        self.cw = self
            .cw
            .saturating_add(1)
            .saturating_mul(2)
            .saturating_sub(1)
            .min(self.cfg.cw_max);
        self.retries += 1;

        if self.retries > self.cfg.max_retries {
            self.counters.retry_drops += 1;
            self.cw = self.cfg.cw_min;
            self.retries = 0;
            if let Some(pkt) = self.queue.dequeue() {
                debug!(node = ?self.node, pkt_id = pkt.id, "❌ 超过重传上限，丢弃");
                return FailureOutcome::Dropped(pkt);
            }
        }
        FailureOutcome::Retry
    }
}
