//! Flow monitor
//!
//! 按 flow 五元组（这里简化为源地址、目的地址、目的端口）分类，累计收发字节、包数和时延。

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::trace;

use crate::sim::SimTime;
use crate::wifi::FlowId;

/// flow 的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FlowKey {
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub dst_port: u16,
}

/// 单个 flow 的累计观测
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowRecord {
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub delay_sum: SimTime,
    pub first_tx: Option<SimTime>,
    pub last_rx: Option<SimTime>,
}

/// 快照中的一条：flow id + 分类键 + 记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStats {
    pub flow_id: FlowId,
    pub key: FlowKey,
    pub record: FlowRecord,
}

/// 冻结的全部 flow 记录，按 flow id 升序
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSnapshot {
    pub flows: Vec<FlowStats>,
    /// 快照时刻
    pub taken_at: SimTime,
}

impl FlowSnapshot {
    pub fn get(&self, flow_id: FlowId) -> Option<&FlowStats> {
        self.flows.iter().find(|f| f.flow_id == flow_id)
    }
}

#[derive(Debug, Default)]
pub struct FlowMonitor {
    classifier: HashMap<FlowKey, FlowId>,
    keys: BTreeMap<FlowId, FlowKey>,
    records: BTreeMap<FlowId, FlowRecord>,
}

impl FlowMonitor {
    /// 查找或分配 flow id（从 1 开始，按首次出现顺序）
    pub fn classify(&mut self, key: &FlowKey) -> FlowId {
        if let Some(id) = self.classifier.get(key) {
            return *id;
        }
        let id = FlowId(self.keys.len() as u32 + 1);
        self.classifier.insert(*key, id);
        self.keys.insert(id, *key);
        trace!(flow_id = id.0, ?key, "分配 flow id");
        id
    }

    pub fn key(&self, flow: FlowId) -> Option<&FlowKey> {
        self.keys.get(&flow)
    }

    pub fn record_tx(&mut self, flow: FlowId, bytes: u32, now: SimTime) {
        let rec = self.records.entry(flow).or_default();
        rec.tx_bytes += bytes as u64;
        rec.tx_packets += 1;
        rec.first_tx.get_or_insert(now);
    }

    pub fn record_rx(&mut self, flow: FlowId, bytes: u32, now: SimTime, delay: SimTime) {
        let rec = self.records.entry(flow).or_default();
        rec.rx_bytes += bytes as u64;
        rec.rx_packets += 1;
        rec.delay_sum = rec.delay_sum.saturating_add(delay);
        rec.last_rx = Some(now);
    }

    /// 包被 MAC 永久丢弃（重传超限或队列满）
    pub fn record_lost(&mut self, flow: FlowId, bytes: u32, now: SimTime) {
        let rec = self.records.entry(flow).or_default();
        rec.lost_packets += 1;
        trace!(flow_id = flow.0, bytes, ?now, "记录丢包");
    }

    pub fn record(&self, flow: FlowId) -> Option<&FlowRecord> {
        self.records.get(&flow)
    }

    /// 拷贝出当前所有记录
    pub fn snapshot(&self, now: SimTime) -> FlowSnapshot {
        let flows = self
            .records
            .iter()
            .filter_map(|(id, rec)| {
                let key = self.keys.get(id)?;
                Some(FlowStats {
                    flow_id: *id,
                    key: *key,
                    record: rec.clone(),
                })
            })
            .collect();
        FlowSnapshot {
            flows,
            taken_at: now,
        }
    }
}
