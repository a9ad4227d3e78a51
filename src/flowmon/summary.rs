//! 吞吐统计
//!
//! 排除源地址为 AP 的 flow 后，对每个 flow 计算吞吐（Mbps），再求和、均值、总体方差（除以 n）与标准差。

use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::debug;

use super::monitor::{FlowKey, FlowSnapshot};
use crate::error::{Error, Result};
use crate::wifi::FlowId;

/// 单个 flow 的吞吐与时延
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowThroughput {
    pub flow_id: FlowId,
    pub key: FlowKey,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub throughput_mbps: f64,
    /// 平均时延（微秒）；没有收到任何包时为 NaN
    pub avg_delay_us: f64,
}

/// 汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputSummary {
    pub flows: Vec<FlowThroughput>,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
}

/// `rx_bytes` 在 `duration_s` 内对应的吞吐（Mbps）
pub fn throughput_mbps(rx_bytes: u64, duration_s: f64) -> f64 {
    rx_bytes as f64 * 8.0 / (1e6 * duration_s)
}

/// 由快照计算吞吐统计
pub fn summarize(
    snapshot: &FlowSnapshot,
    ap_addr: Ipv4Addr,
    duration_s: f64,
) -> Result<ThroughputSummary> {
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return Err(Error::Configuration(format!(
            "simulation duration must be positive, got {duration_s}"
        )));
    }

    let flows: Vec<FlowThroughput> = snapshot
        .flows
        .iter()
        .filter(|f| f.key.src_addr != ap_addr)
        .map(|f| {
            let rec = &f.record;
            let avg_delay_us = if rec.rx_packets == 0 {
                f64::NAN
            } else {
                rec.delay_sum.as_micros_f64() / rec.rx_packets as f64
            };
            FlowThroughput {
                flow_id: f.flow_id,
                key: f.key,
                tx_bytes: rec.tx_bytes,
                rx_bytes: rec.rx_bytes,
                rx_packets: rec.rx_packets,
                lost_packets: rec.lost_packets,
                throughput_mbps: throughput_mbps(rec.rx_bytes, duration_s),
                avg_delay_us,
            }
        })
        .collect();

    if flows.is_empty() {
        return Err(Error::NoFlows);
    }

    let n = flows.len() as f64;
    let sum: f64 = flows.iter().map(|f| f.throughput_mbps).sum();
    let sum_sq: f64 = flows.iter().map(|f| f.throughput_mbps * f.throughput_mbps).sum();
    let mean = sum / n;
    let variance = (sum_sq - sum * sum / n) / n;
    // 浮点误差可能让方差成为极小的负数
    let std = variance.max(0.0).sqrt();

    debug!(count = flows.len(), sum, mean, variance, std, "吞吐统计完成");

    Ok(ThroughputSummary {
        count: flows.len(),
        flows,
        sum,
        mean,
        variance,
        std,
    })
}
