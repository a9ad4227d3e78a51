//! 基础设施拓扑构建
//!
//! 拓扑结构：一个 AP，N 个 STA；每个 STA 上一个 on/off 上行流量源，AP 上一个接收端。
//! 地址按 AP、STA0、STA1… 的顺序从 192.168.0.1 开始分配。

use std::net::Ipv4Addr;

use tracing::info;

use super::config::{BASE_PORT, ScenarioConfig};
use crate::error::Result;
use crate::sim::seeded_rng;
use crate::wifi::{NodeId, Role, WlanWorld};

const NETWORK_BASE: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 0);

/// 第 `index` 个被分配地址的设备
pub fn host_addr(index: u32) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(NETWORK_BASE) + 1 + index)
}

/// 构建好的场景：世界 + AP 与各 STA 的节点 id
pub struct Infrastructure {
    pub world: WlanWorld,
    pub ap: NodeId,
    pub stas: Vec<NodeId>,
}

/// 构建"一个 AP + N 个 STA"的世界（不调度任何事件）
pub fn build_infrastructure(cfg: &ScenarioConfig) -> Result<Infrastructure> {
    let rng = seeded_rng(cfg.seed, cfg.run);
    let mut world = WlanWorld::new(&cfg.channel, cfg.phy.clone(), rng);

    let ap = world.add_node(
        "ap",
        Role::Ap,
        host_addr(0),
        cfg.ap_position,
        cfg.mac.clone(),
    )?;
    world.install_sink(ap);

    let on_off = cfg.on_off();
    let mut stas = Vec::with_capacity(cfg.sta_count as usize);
    for i in 0..cfg.sta_count {
        let sta = world.add_node(
            format!("sta{i}"),
            Role::Sta,
            host_addr(1 + i),
            cfg.sta_position,
            cfg.mac.clone(),
        )?;
        // 端口范围已在 validate 中检查
        let port = BASE_PORT.saturating_add(i as u16);
        world.add_app(sta, ap, port, on_off.clone())?;
        stas.push(sta);
    }

    info!(
        stas = stas.len(),
        ap_addr = %host_addr(0),
        sensitivity_dbm = world.channel.sensitivity_dbm(),
        "🏗️  基础设施拓扑构建完成"
    );
    Ok(Infrastructure { world, ap, stas })
}
