//! AP 侧接收端
//!
//! 每收到一个数据包就把（字节数、到达时间、时延）记入 flow monitor，同时是 ACK 的逻辑来源。

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::id::{FlowId, NodeId};
use super::packet::Packet;
use super::wlan_world::{WlanWorld, wlan_world};
use crate::error::Result;
use crate::sim::{Event, Simulator, World};

/// 数据包接收端
#[derive(Debug, Default)]
pub struct PacketSink {
    node: Option<NodeId>,
    rx_bytes: BTreeMap<FlowId, u64>,
    total_rx_bytes: u64,
}

impl PacketSink {
    pub fn new(node: NodeId) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// 某个 flow 累计收到的字节数
    pub fn rx_bytes(&self, flow: FlowId) -> u64 {
        self.rx_bytes.get(&flow).copied().unwrap_or(0)
    }

    pub fn total_rx_bytes(&self) -> u64 {
        self.total_rx_bytes
    }

    fn receive(&mut self, pkt: &Packet) {
        *self.rx_bytes.entry(pkt.flow).or_default() += pkt.size_bytes as u64;
        self.total_rx_bytes += pkt.size_bytes as u64;
    }
}

/// 事件：数据包到达接收端
#[derive(Debug)]
pub struct RxDelivery {
    pub pkt: Packet,
}

impl Event for RxDelivery {
    #[tracing::instrument(skip(self, sim, world), fields(pkt_id = self.pkt.id, flow_id = self.pkt.flow.0))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<()> {
        let RxDelivery { pkt } = *self;
        wlan_world(world)?.on_rx_delivery(pkt, sim);
        Ok(())
    }
}

impl WlanWorld {
    /// 数据包送达目的节点时的处理
    pub(crate) fn on_rx_delivery(&mut self, pkt: Packet, sim: &mut Simulator) {
        let now = sim.now();
        if self.sink.node() != Some(pkt.dst) {
            warn!(dst = ?pkt.dst, "目的节点上没有接收端，丢弃");
            return;
        }

        let delay = now.saturating_sub(pkt.created_at);
        self.sink.receive(&pkt);
        self.flowmon.record_rx(pkt.flow, pkt.size_bytes, now, delay);

        debug!("✅ 数据包送达目的地");
        trace!(
            size_bytes = pkt.size_bytes,
            seq = pkt.seq,
            delay = ?delay,
            flow_rx_bytes = self.sink.rx_bytes(pkt.flow),
            "更新统计信息"
        );
    }
}
