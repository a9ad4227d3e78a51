//! 场景驱动
//!
//! 读取 `ScenarioConfig`，构建世界、运行仿真，并在仿真结束后产出 flow 快照与统计。

mod build;
mod config;
mod report;
mod sweep;

pub use build::{Infrastructure, build_infrastructure, host_addr};
pub use config::{BASE_PORT, ScenarioConfig, parse_data_rate};
pub use report::{append_csv_row, csv_row, write_flow_diagnostics, write_overview};
pub use sweep::{SweepJob, SweepOutcome, SweepSpec, run_sweep};

use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::flowmon::{FlowSnapshot, ThroughputSummary, summarize};
use crate::sim::{SimTime, Simulator};
use crate::wifi::{MacCounters, NodeId};

/// 一次仿真的原始结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub simulation_time_s: f64,
    pub sta_count: u32,
    pub ap_addr: Ipv4Addr,
    pub snapshot: FlowSnapshot,
    /// 每个节点的 MAC 计数（AP 在前）
    pub mac_counters: Vec<(NodeId, MacCounters)>,
    pub collisions: u64,
    pub final_time: SimTime,
}

impl ScenarioReport {
    /// 吞吐统计（排除 AP 发出的 flow）
    pub fn summarize(&self) -> Result<ThroughputSummary> {
        summarize(&self.snapshot, self.ap_addr, self.simulation_time_s)
    }
}

/// 运行一个场景直到 `simulation_time_s`
#[tracing::instrument(skip(cfg), fields(stas = cfg.sta_count, seed = cfg.seed, run = cfg.run))]
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<ScenarioReport> {
    cfg.validate()?;

    let Infrastructure { mut world, ap, .. } = build_infrastructure(cfg)?;
    let mut sim = Simulator::default();
    world.schedule_apps(&mut sim)?;

    info!("▶️  开始运行场景");
    sim.run_until(cfg.stop_time(), &mut world)?;
    info!(final_time = ?sim.now(), "✅ 场景运行结束");

    let ap_addr = world.node(ap)?.addr;
    Ok(ScenarioReport {
        simulation_time_s: cfg.simulation_time_s,
        sta_count: cfg.sta_count,
        ap_addr,
        snapshot: world.flowmon.snapshot(sim.now()),
        mac_counters: world.macs.iter().map(|m| (m.node(), m.counters)).collect(),
        collisions: world.medium.collisions(),
        final_time: sim.now(),
    })
}
