//! On/Off 流量源
//!
//! "on" 阶段内按 `packet_size·8 / data_rate` 的间隔发包，"off" 阶段不发。
//! `off_time` 为 0 表示一直处于 on。每个包先记入 flow monitor，再交给本节点的 MAC。

use tracing::{debug, info};

use super::id::{AppId, FlowId, NodeId};
use super::wlan_world::{WlanWorld, wlan_world};
use crate::error::Result;
use crate::flowmon::FlowKey;
use crate::sim::{Event, EventId, SimTime, Simulator, World};

#[derive(Debug, Clone)]
pub struct OnOffConfig {
    pub packet_size: u32,
    pub data_rate_bps: u64,
    pub on_time: SimTime,
    pub off_time: SimTime,
    pub start: SimTime,
    pub stop: SimTime,
}

impl OnOffConfig {
    /// 两个包之间的间隔（向上取整到纳秒）
    pub fn interval(&self) -> SimTime {
        if self.data_rate_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (self.packet_size as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (self.data_rate_bps as u128 - 1))
            / self.data_rate_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}

#[derive(Debug)]
pub struct OnOffApp {
    pub id: AppId,
    pub node: NodeId,
    pub remote: NodeId,
    pub key: FlowKey,
    pub cfg: OnOffConfig,
    flow: Option<FlowId>,
    running: bool,
    /// 当前 on 阶段的结束时刻；None 表示一直 on
    on_until: Option<SimTime>,
    next_send: Option<EventId>,
    next_seq: u64,
    pub sent_packets: u64,
    pub sent_bytes: u64,
}

impl OnOffApp {
    pub fn new(id: AppId, node: NodeId, remote: NodeId, key: FlowKey, cfg: OnOffConfig) -> Self {
        Self {
            id,
            node,
            remote,
            key,
            cfg,
            flow: None,
            running: false,
            on_until: None,
            next_send: None,
            next_seq: 0,
            sent_packets: 0,
            sent_bytes: 0,
        }
    }

    pub fn flow(&self) -> Option<FlowId> {
        self.flow
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 计算下一次发包时刻，必要时跨过 off 阶段。
    ///
    /// on 阶段结束时尚未用完的间隔顺延到下一个 on 阶段。
    fn next_send_time(&mut self, now: SimTime) -> SimTime {
        let mut next = now.saturating_add(self.cfg.interval());
        if self.cfg.on_time == SimTime::ZERO {
            return next;
        }
        while let Some(on_until) = self.on_until {
            if next <= on_until {
                break;
            }
            let residual = next.saturating_sub(on_until);
            let next_on = on_until.saturating_add(self.cfg.off_time);
            self.on_until = Some(next_on.saturating_add(self.cfg.on_time));
            next = next_on.saturating_add(residual);
        }
        next
    }
}

impl WlanWorld {
    /// 调度所有流量源的启动与停止
    pub fn schedule_apps(&self, sim: &mut Simulator) -> Result<()> {
        for app in &self.apps {
            sim.schedule(app.cfg.start, AppStart { app: app.id })?;
            sim.schedule(app.cfg.stop, AppStop { app: app.id })?;
        }
        Ok(())
    }

    fn on_app_start(&mut self, app: AppId, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let Some(key) = self.apps.get(app.0).map(|a| a.key) else {
            return Ok(());
        };
        let flow = self.flowmon.classify(&key);
        let Some(a) = self.app_mut(app) else {
            return Ok(());
        };
        a.flow = Some(flow);
        a.running = true;
        a.on_until = if a.cfg.off_time == SimTime::ZERO {
            None
        } else {
            Some(now.saturating_add(a.cfg.on_time))
        };
        info!(node = ?a.node, flow_id = flow.0, key = ?a.key, "🚦 流量源启动");
        self.schedule_next_send(app, sim)
    }

    fn schedule_next_send(&mut self, app: AppId, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let Some(a) = self.app_mut(app) else {
            return Ok(());
        };
        let next = a.next_send_time(now);
        if next >= a.cfg.stop {
            a.next_send = None;
            return Ok(());
        }
        a.next_send = Some(sim.schedule(next, AppSend { app })?);
        Ok(())
    }

    fn on_app_send(&mut self, app: AppId, sim: &mut Simulator) -> Result<()> {
        let now = sim.now();
        let Some(a) = self.app_mut(app) else {
            return Ok(());
        };
        a.next_send = None;
        let (Some(flow), true) = (a.flow, a.running) else {
            return Ok(());
        };
        let seq = a.next_seq;
        a.next_seq += 1;
        a.sent_packets += 1;
        a.sent_bytes += a.cfg.packet_size as u64;
        let (node, remote, size) = (a.node, a.remote, a.cfg.packet_size);

        let pkt = self.make_packet(flow, seq, node, remote, size, now);
        debug!(pkt_id = pkt.id, flow_id = flow.0, seq, "应用层发包");
        self.flowmon.record_tx(flow, size, now);
        self.mac_enqueue(node, pkt, sim)?;
        self.schedule_next_send(app, sim)
    }

    fn on_app_stop(&mut self, app: AppId, sim: &mut Simulator) {
        let Some(a) = self.app_mut(app) else {
            return;
        };
        a.running = false;
        if let Some(id) = a.next_send.take() {
            sim.cancel(id);
        }
        info!(node = ?a.node, sent_packets = a.sent_packets, "流量源停止");
    }
}

/// 事件：流量源启动
#[derive(Debug)]
pub struct AppStart {
    pub app: AppId,
}

impl Event for AppStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        wlan_world(world)?.on_app_start(self.app, sim)
    }
}

/// 事件：流量源发出一个包
#[derive(Debug)]
pub struct AppSend {
    pub app: AppId,
}

impl Event for AppSend {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        wlan_world(world)?.on_app_send(self.app, sim)
    }
}

/// 事件：流量源停止（取消尚未执行的发包事件）
#[derive(Debug)]
pub struct AppStop {
    pub app: AppId,
}

impl Event for AppStop {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        wlan_world(world)?.on_app_stop(self.app, sim);
        Ok(())
    }
}
