//! 无线世界实现
//!
//! 定义无线仿真的世界（World）实现：节点 arena、拓扑、信道、共享介质、每节点 MAC、
//! 流量源、AP 侧接收端、flow monitor 以及唯一的随机数发生器。

use std::any::Any;
use std::net::Ipv4Addr;

use rand::rngs::StdRng;

use super::app::{OnOffApp, OnOffConfig};
use super::channel::{ChannelConfig, ChannelModel};
use super::id::{AppId, FlowId, NodeId};
use super::mac::{Mac, MacConfig};
use super::medium::Medium;
use super::node::{Node, Role};
use super::packet::Packet;
use super::phy::PhyConfig;
use super::sink::PacketSink;
use super::topology::{Position, Topology};
use crate::error::{Error, Result};
use crate::flowmon::{FlowKey, FlowMonitor};
use crate::sim::{SimTime, World};

pub struct WlanWorld {
    pub nodes: Vec<Node>,
    pub topo: Topology,
    pub channel: ChannelModel,
    pub phy: PhyConfig,
    pub medium: Medium,
    /// 与 `nodes` 一一对应
    pub macs: Vec<Mac>,
    pub apps: Vec<OnOffApp>,
    pub sink: PacketSink,
    pub flowmon: FlowMonitor,
    pub rng: StdRng,
    next_pkt_id: u64,
}

impl WlanWorld {
    pub fn new(channel: &ChannelConfig, phy: PhyConfig, rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            topo: Topology::default(),
            channel: ChannelModel::new(channel, phy.data_rate_bps),
            phy,
            medium: Medium::default(),
            macs: Vec::new(),
            apps: Vec::new(),
            sink: PacketSink::default(),
            flowmon: FlowMonitor::default(),
            rng,
            next_pkt_id: 0,
        }
    }

    /// 添加节点：放置位置并为其创建独立的 MAC 实体
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        role: Role,
        addr: Ipv4Addr,
        pos: Position,
        mac: MacConfig,
    ) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        self.topo.place(id, pos)?;
        self.nodes.push(Node::new(id, name, role, addr));
        self.macs.push(Mac::new(id, mac));
        Ok(id)
    }

    /// 在 `node` 上安装一个 on/off 流量源，目标为 `remote:port`
    pub fn add_app(
        &mut self,
        node: NodeId,
        remote: NodeId,
        port: u16,
        cfg: OnOffConfig,
    ) -> Result<AppId> {
        let key = FlowKey {
            src_addr: self.node(node)?.addr,
            dst_addr: self.node(remote)?.addr,
            dst_port: port,
        };
        let id = AppId(self.apps.len());
        self.apps.push(OnOffApp::new(id, node, remote, key, cfg));
        Ok(id)
    }

    pub fn install_sink(&mut self, node: NodeId) {
        self.sink = PacketSink::new(node);
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    /// 第一个 AP 节点
    pub fn ap(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_ap())
    }

    pub fn mac(&self, node: NodeId) -> Result<&Mac> {
        self.macs.get(node.0).ok_or(Error::UnknownNode(node))
    }

    pub(crate) fn mac_mut(&mut self, node: NodeId) -> Result<&mut Mac> {
        self.macs.get_mut(node.0).ok_or(Error::UnknownNode(node))
    }

    pub(crate) fn app_mut(&mut self, app: AppId) -> Option<&mut OnOffApp> {
        self.apps.get_mut(app.0)
    }

    /// 创建数据包
    pub fn make_packet(
        &mut self,
        flow: FlowId,
        seq: u64,
        src: NodeId,
        dst: NodeId,
        size_bytes: u32,
        now: SimTime,
    ) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet {
            id,
            flow,
            seq,
            src,
            dst,
            size_bytes,
            created_at: now,
        }
    }
}

impl World for WlanWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 从 `&mut dyn World` 取出 `WlanWorld`
pub(crate) fn wlan_world(world: &mut dyn World) -> Result<&mut WlanWorld> {
    world
        .as_any_mut()
        .downcast_mut::<WlanWorld>()
        .ok_or(Error::WorldMismatch)
}
