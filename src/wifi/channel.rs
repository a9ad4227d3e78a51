//! 无线信道模型
//!
//! 给定收发两端的位置与发射功率，计算：
//! - 接收信号强度（由可插拔的路径损耗模型给出）
//! - 传播时延（恒定传播速度）
//! - 是否能成功接收（RSS ≥ 当前速率对应的接收灵敏度）
//!
//! 信道本身无误码注入，丢包只来自信号过弱或 MAC 层碰撞。

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::id::NodeId;
use super::topology::Topology;
use crate::error::{Error, Result};
use crate::sim::SimTime;

/// 真空光速（m/s）
pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;

/// 路径损耗模型
pub trait PropagationLoss: Debug + Send {
    /// 由发射功率与距离计算接收功率（dBm）
    fn rx_power_dbm(&self, tx_power_dbm: f64, distance_m: f64) -> f64;
}

/// 固定 RSS：接收功率与距离无关
#[derive(Debug, Clone, Copy)]
pub struct FixedRss {
    pub rss_dbm: f64,
}

impl PropagationLoss for FixedRss {
    fn rx_power_dbm(&self, _tx_power_dbm: f64, _distance_m: f64) -> f64 {
        self.rss_dbm
    }
}

/// 对数距离路径损耗：`L = L0 + 10·n·log10(d / d0)`
#[derive(Debug, Clone, Copy)]
pub struct LogDistance {
    pub exponent: f64,
    pub reference_distance_m: f64,
    pub reference_loss_db: f64,
}

impl PropagationLoss for LogDistance {
    fn rx_power_dbm(&self, tx_power_dbm: f64, distance_m: f64) -> f64 {
        if distance_m <= self.reference_distance_m {
            return tx_power_dbm - self.reference_loss_db;
        }
        let loss = self.reference_loss_db
            + 10.0 * self.exponent * (distance_m / self.reference_distance_m).log10();
        tx_power_dbm - loss
    }
}

/// Friis 自由空间损耗
#[derive(Debug, Clone, Copy)]
pub struct Friis {
    pub frequency_hz: f64,
    /// 系统损耗（线性，≥ 1）
    pub system_loss: f64,
}

impl PropagationLoss for Friis {
    fn rx_power_dbm(&self, tx_power_dbm: f64, distance_m: f64) -> f64 {
        if distance_m <= 0.0 {
            return tx_power_dbm;
        }
        let lambda = SPEED_OF_LIGHT_MPS / self.frequency_hz;
        let num = lambda * lambda;
        let den = 16.0 * std::f64::consts::PI * std::f64::consts::PI * distance_m * distance_m
            * self.system_loss;
        let loss_db = -10.0 * (num / den).log10();
        tx_power_dbm - loss_db
    }
}

/// 路径损耗模型配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LossModelConfig {
    FixedRss {
        rss_dbm: f64,
    },
    LogDistance {
        #[serde(default = "default_log_exponent")]
        exponent: f64,
        #[serde(default = "default_reference_distance")]
        reference_distance_m: f64,
        #[serde(default = "default_reference_loss")]
        reference_loss_db: f64,
    },
    Friis {
        #[serde(default = "default_frequency")]
        frequency_hz: f64,
        #[serde(default = "default_system_loss")]
        system_loss: f64,
    },
}

fn default_log_exponent() -> f64 {
    3.0
}
fn default_reference_distance() -> f64 {
    1.0
}
fn default_reference_loss() -> f64 {
    46.6777
}
fn default_frequency() -> f64 {
    2.4e9
}
fn default_system_loss() -> f64 {
    1.0
}

impl Default for LossModelConfig {
    fn default() -> Self {
        LossModelConfig::FixedRss { rss_dbm: -80.0 }
    }
}

impl LossModelConfig {
    pub fn build(&self) -> Box<dyn PropagationLoss> {
        match *self {
            LossModelConfig::FixedRss { rss_dbm } => Box::new(FixedRss { rss_dbm }),
            LossModelConfig::LogDistance {
                exponent,
                reference_distance_m,
                reference_loss_db,
            } => Box::new(LogDistance {
                exponent,
                reference_distance_m,
                reference_loss_db,
            }),
            LossModelConfig::Friis {
                frequency_hz,
                system_loss,
            } => Box::new(Friis {
                frequency_hz,
                system_loss,
            }),
        }
    }
}

/// 信道配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    pub loss: LossModelConfig,
    pub tx_power_dbm: f64,
    /// 传播速度（m/s）
    pub propagation_speed_mps: f64,
    /// 接收灵敏度（dBm）；None 表示按 PHY 速率查表
    pub sensitivity_dbm: Option<f64>,
    /// 载波侦听门限（dBm）
    pub cca_threshold_dbm: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            loss: LossModelConfig::default(),
            tx_power_dbm: 16.0206,
            propagation_speed_mps: SPEED_OF_LIGHT_MPS,
            sensitivity_dbm: None,
            cca_threshold_dbm: -99.0,
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.propagation_speed_mps.is_finite() && self.propagation_speed_mps > 0.0) {
            return Err(Error::Configuration(format!(
                "propagation speed must be positive, got {}",
                self.propagation_speed_mps
            )));
        }
        if let LossModelConfig::Friis { frequency_hz, system_loss } = self.loss {
            if frequency_hz <= 0.0 || system_loss < 1.0 {
                return Err(Error::Configuration(
                    "friis model needs frequency > 0 and system loss >= 1".into(),
                ));
            }
        }
        if let LossModelConfig::LogDistance { reference_distance_m, .. } = self.loss {
            if reference_distance_m <= 0.0 {
                return Err(Error::Configuration(
                    "log-distance reference distance must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

/// DSSS 各速率的典型接收灵敏度（dBm）
pub fn dsss_sensitivity_dbm(rate_bps: u64) -> f64 {
    match rate_bps {
        0..=1_000_000 => -94.0,
        1_000_001..=2_000_000 => -91.0,
        2_000_001..=5_500_000 => -89.0,
        _ => -85.0,
    }
}

/// 一次收发的链路预算
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBudget {
    pub distance_m: f64,
    pub rx_power_dbm: f64,
    pub delay: SimTime,
    pub delivered: bool,
}

/// 共享信道模型
#[derive(Debug)]
pub struct ChannelModel {
    loss: Box<dyn PropagationLoss>,
    tx_power_dbm: f64,
    speed_mps: f64,
    sensitivity_dbm: f64,
    cca_threshold_dbm: f64,
}

impl ChannelModel {
    pub fn new(cfg: &ChannelConfig, phy_rate_bps: u64) -> Self {
        Self {
            loss: cfg.loss.build(),
            tx_power_dbm: cfg.tx_power_dbm,
            speed_mps: cfg.propagation_speed_mps,
            sensitivity_dbm: cfg
                .sensitivity_dbm
                .unwrap_or_else(|| dsss_sensitivity_dbm(phy_rate_bps)),
            cca_threshold_dbm: cfg.cca_threshold_dbm,
        }
    }

    pub fn sensitivity_dbm(&self) -> f64 {
        self.sensitivity_dbm
    }

    /// 传播时延；距离为 0 时为 0
    pub fn propagation_delay(&self, distance_m: f64) -> SimTime {
        if distance_m <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime::from_secs_f64(distance_m / self.speed_mps)
    }

    pub fn rx_power_dbm(&self, distance_m: f64) -> f64 {
        self.loss.rx_power_dbm(self.tx_power_dbm, distance_m)
    }

    /// 计算 from -> to 的链路预算
    pub fn link_budget(&self, topo: &Topology, from: NodeId, to: NodeId) -> Result<LinkBudget> {
        let distance_m = topo.distance(from, to)?;
        let rx_power_dbm = self.rx_power_dbm(distance_m);
        Ok(LinkBudget {
            distance_m,
            rx_power_dbm,
            delay: self.propagation_delay(distance_m),
            delivered: rx_power_dbm >= self.sensitivity_dbm,
        })
    }

    /// 该链路上的信号能否被接收端侦听到（用于载波侦听）
    pub fn can_sense(&self, budget: &LinkBudget) -> bool {
        budget.rx_power_dbm >= self.cca_threshold_dbm
    }
}
