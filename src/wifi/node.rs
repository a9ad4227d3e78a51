//! 节点类型
//!
//! 定义无线节点（AP / STA）。节点只是 arena 中的一条记录，位置由 `Topology` 单独持有。

use std::net::Ipv4Addr;

use super::id::NodeId;

/// 节点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 接入点
    Ap,
    /// 终端
    Sta,
}

/// 无线节点
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub role: Role,
    pub addr: Ipv4Addr,
}

impl Node {
    /// 创建新节点
    pub fn new(id: NodeId, name: impl Into<String>, role: Role, addr: Ipv4Addr) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            addr,
        }
    }

    pub fn is_ap(&self) -> bool {
        self.role == Role::Ap
    }
}
