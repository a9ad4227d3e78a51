//! 拓扑（节点位置）
//!
//! 每个节点在建场景时放置一次，之后位置不可变。

use super::id::NodeId;
use crate::error::{Error, Result};

/// 三维坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 欧氏距离
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// 静态拓扑：按 `NodeId` 下标存放位置
#[derive(Debug, Default, Clone)]
pub struct Topology {
    positions: Vec<Option<Position>>,
}

impl Topology {
    /// 放置节点；同一节点放置两次返回 [`Error::DuplicatePlacement`]
    pub fn place(&mut self, node: NodeId, pos: Position) -> Result<()> {
        if self.positions.len() <= node.0 {
            self.positions.resize(node.0 + 1, None);
        }
        let slot = &mut self.positions[node.0];
        if slot.is_some() {
            return Err(Error::DuplicatePlacement(node));
        }
        *slot = Some(pos);
        Ok(())
    }

    pub fn position(&self, node: NodeId) -> Option<Position> {
        self.positions.get(node.0).copied().flatten()
    }

    /// 两个已放置节点之间的距离（米）
    pub fn distance(&self, a: NodeId, b: NodeId) -> Result<f64> {
        let pa = self.position(a).ok_or(Error::UnknownNode(a))?;
        let pb = self.position(b).ok_or(Error::UnknownNode(b))?;
        Ok(pa.distance_to(&pb))
    }
}
