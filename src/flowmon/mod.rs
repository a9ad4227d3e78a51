//! 流量监控与统计
//!
//! `FlowMonitor` 在网络边界记录每个 flow 的收发；`summarize` 在仿真结束后把快照归约为吞吐统计。

mod monitor;
mod summary;

pub use monitor::{FlowKey, FlowMonitor, FlowRecord, FlowSnapshot, FlowStats};
pub use summary::{FlowThroughput, ThroughputSummary, summarize, throughput_mbps};
