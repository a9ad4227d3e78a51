//! DCF 介质访问流程
//!
//! 把每节点的 `Mac` 状态机与共享介质、信道模型、事件调度连接起来：
//! - 入队后空闲的 MAC 开始退避（DIFS 之后开始计 slot）
//! - 每个 slot 做载波侦听：介质忙则冻结计数，介质恢复空闲后再等一个 DIFS 继续
//! - 计数到 0 开始发送；与其它正在进行的传输重叠即为碰撞
//! - 发送结束后，成功送达则占用介质完成 ACK 交换，否则等待 ACK 超时

use tracing::{debug, trace};

use super::id::NodeId;
use super::mac::{FailureOutcome, MacState};
use super::mac_events::{AckOutcome, BackoffSlot, MediumCheck, TxEnd};
use super::packet::Packet;
use super::sink::RxDelivery;
use super::wlan_world::WlanWorld;
use crate::error::{Error, Result};
use crate::sim::{SimTime, Simulator};

impl WlanWorld {
    /// 把包交给节点的 MAC
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id, flow_id = pkt.flow.0))]
    pub fn mac_enqueue(&mut self, node: NodeId, pkt: Packet, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let rejected = self.mac_mut(node)?.enqueue(pkt).err();
        if let Some(pkt) = rejected {
            self.flowmon.record_lost(pkt.flow, pkt.size_bytes, now);
            return Ok(());
        }
        if self.mac(node)?.state() == MacState::Idle {
            self.start_backoff(node, sim)?;
        }
        Ok(())
    }

    /// 抽取退避 slot 数，并在一个 DIFS 之后开始计数
    fn start_backoff(&mut self, node: NodeId, sim: &mut Simulator) -> Result<()> {
        let difs = self.phy.difs();
        let WlanWorld { macs, rng, .. } = self;
        let mac = macs.get_mut(node.0).ok_or(Error::UnknownNode(node))?;
        mac.begin_backoff(rng);
        let id = sim.schedule_in(difs, BackoffSlot { node })?;
        mac.slot_event = Some(id);
        Ok(())
    }

    /// `node` 在 `now` 是否侦听到介质忙
    pub fn medium_busy_for(&self, node: NodeId, now: SimTime) -> Result<bool> {
        if self.medium.reserved_until() > now {
            return Ok(true);
        }
        for tx in self.medium.active() {
            if tx.sender == node {
                return Ok(true);
            }
            let budget = self.channel.link_budget(&self.topo, tx.sender, node)?;
            if !self.channel.can_sense(&budget) {
                continue;
            }
            // 同一时刻开始的传输还来不及被侦听到
            let heard_from = tx.start.saturating_add(budget.delay);
            let heard_until = tx.end.saturating_add(budget.delay);
            if heard_from < now && heard_until > now {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// 退避 slot 边界
    pub(crate) fn on_backoff_slot(&mut self, node: NodeId, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let busy = self.medium_busy_for(node, now)?;
        let slot = self.phy.slot();

        let mac = self.mac_mut(node)?;
        mac.slot_event = None;
        if mac.state() != MacState::Backoff {
            return Ok(());
        }
        if busy {
            mac.pause();
            trace!(node = ?node, remaining = mac.backoff_slots(), "介质忙，冻结退避");
            return Ok(());
        }
        if mac.idle_slot() {
            return self.start_transmission(node, sim);
        }
        let id = sim.schedule_in(slot, BackoffSlot { node })?;
        mac.slot_event = Some(id);
        Ok(())
    }

    fn start_transmission(&mut self, node: NodeId, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let Some(size) = self.mac(node)?.head().map(|p| p.size_bytes) else {
            self.mac_mut(node)?.set_state(MacState::Idle);
            return Ok(());
        };
        let end = now.saturating_add(self.phy.frame_duration(size));
        let tx_id = self.medium.begin(node, now, end);
        self.mac_mut(node)?.start_attempt();

        debug!(node = ?node, tx_id, ?now, ?end, size, "📡 开始发送");
        sim.schedule(end, TxEnd { node, tx_id })?;
        Ok(())
    }

    /// 数据帧发送完毕
    #[tracing::instrument(skip(self, sim))]
    pub(crate) fn on_tx_end(&mut self, node: NodeId, tx_id: u64, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let collided = self.medium.finish(tx_id).is_none_or(|tx| tx.collided);

        let mac = self.mac_mut(node)?;
        mac.set_state(MacState::WaitingAck);
        let Some(pkt) = mac.head().cloned() else {
            mac.set_state(MacState::Idle);
            return Ok(());
        };

        let budget = self.channel.link_budget(&self.topo, node, pkt.dst)?;
        if !collided && budget.delivered {
            let rx_at = now.saturating_add(budget.delay);
            let ack_end = rx_at
                .saturating_add(self.phy.sifs())
                .saturating_add(self.phy.ack_duration())
                .saturating_add(budget.delay);
            self.medium.reserve_until(ack_end);

            trace!(?rx_at, ?ack_end, rx_power_dbm = budget.rx_power_dbm, "数据帧送达，等待 ACK");
            sim.schedule(rx_at, RxDelivery { pkt })?;
            sim.schedule(ack_end, AckOutcome { node, success: true })?;
            sim.schedule(ack_end, MediumCheck)?;
        } else {
            debug!(
                collided,
                rx_power_dbm = budget.rx_power_dbm,
                "数据帧丢失，等待 ACK 超时"
            );
            sim.schedule_in(self.phy.ack_timeout(), AckOutcome { node, success: false })?;
            sim.schedule(now, MediumCheck)?;
        }
        Ok(())
    }

    /// ACK 交换结束（成功）或 ACK 超时（失败）
    pub(crate) fn on_ack_outcome(
        &mut self,
        node: NodeId,
        success: bool,
        sim: &mut Simulator,
    ) -> Result<()> {
        let now = sim.now();
        let mac = self.mac_mut(node)?;
        let dropped = if success {
            mac.on_success();
            None
        } else {
            match mac.on_failure() {
                FailureOutcome::Retry => None,
                FailureOutcome::Dropped(pkt) => Some(pkt),
            }
        };
        let has_more = mac.queue_len() > 0;

        if let Some(pkt) = dropped {
            debug!(node = ?node, pkt_id = pkt.id, flow_id = pkt.flow.0, "包重传超限被丢弃");
            self.flowmon.record_lost(pkt.flow, pkt.size_bytes, now);
        }

        if has_more {
            self.start_backoff(node, sim)
        } else {
            self.mac_mut(node)?.set_state(MacState::Idle);
            Ok(())
        }
    }

    /// 介质可能恢复空闲：唤醒所有冻结在退避中的节点
    pub(crate) fn on_medium_check(&mut self, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        if !self.medium.is_idle(now) {
            return Ok(());
        }
        let difs = self.phy.difs();
        for mac in self.macs.iter_mut() {
            if mac.state() == MacState::Backoff && mac.is_paused() && mac.slot_event.is_none() {
                mac.resume();
                let node = mac.node();
                let id = sim.schedule_in(difs, BackoffSlot { node })?;
                mac.slot_event = Some(id);
            }
        }
        Ok(())
    }
}
