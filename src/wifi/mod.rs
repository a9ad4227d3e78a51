//! 无线网络模块
//!
//! 一个 AP 加若干 STA 的基础设施网络：节点、拓扑、信道、共享介质、DCF 竞争、流量源与接收端。

// 子模块声明
mod app;
mod channel;
mod dcf;
mod id;
mod mac;
mod mac_events;
mod medium;
mod node;
mod packet;
mod phy;
mod sink;
mod topology;
mod wlan_world;

// 重新导出公共接口
pub use app::{AppSend, AppStart, AppStop, OnOffApp, OnOffConfig};
pub use channel::{
    ChannelConfig, ChannelModel, FixedRss, Friis, LinkBudget, LogDistance, LossModelConfig,
    PropagationLoss, SPEED_OF_LIGHT_MPS, dsss_sensitivity_dbm,
};
pub use id::{AppId, FlowId, NodeId};
pub use mac::{FailureOutcome, Mac, MacConfig, MacCounters, MacState};
pub use mac_events::{AckOutcome, BackoffSlot, MediumCheck, TxEnd};
pub use medium::{Medium, Transmission};
pub use node::{Node, Role};
pub use packet::Packet;
pub use phy::PhyConfig;
pub use sink::{PacketSink, RxDelivery};
pub use topology::{Position, Topology};
pub use wlan_world::WlanWorld;
