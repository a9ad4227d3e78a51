//! PHY 参数与帧时长
//!
//! 默认值对应 802.11b DSSS 11 Mbps、长前导码。

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::SimTime;

/// PHY / DCF 时序配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhyConfig {
    /// 数据帧与控制帧使用的速率（bps）
    pub data_rate_bps: u64,
    pub slot_us: u64,
    pub sifs_us: u64,
    /// PLCP 前导码 + 头部时长
    pub preamble_us: u64,
    /// MAC 头 + FCS（字节）
    pub mac_header_bytes: u32,
    /// ACK 帧长度（字节）
    pub ack_bytes: u32,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            data_rate_bps: 11_000_000,
            slot_us: 20,
            sifs_us: 10,
            preamble_us: 192,
            mac_header_bytes: 28,
            ack_bytes: 14,
        }
    }
}

impl PhyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_rate_bps == 0 {
            return Err(Error::Configuration("phy data rate must be positive".into()));
        }
        if self.slot_us == 0 {
            return Err(Error::Configuration("slot time must be positive".into()));
        }
        Ok(())
    }

    pub fn slot(&self) -> SimTime {
        SimTime::from_micros(self.slot_us)
    }

    pub fn sifs(&self) -> SimTime {
        SimTime::from_micros(self.sifs_us)
    }

    /// DIFS = SIFS + 2·slot
    pub fn difs(&self) -> SimTime {
        SimTime::from_micros(self.sifs_us + 2 * self.slot_us)
    }

    /// 以 PHY 速率发送 `bytes` 字节所需的时间（不含前导码）
    pub fn serialization_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.data_rate_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (self.data_rate_bps as u128 - 1))
            / self.data_rate_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 数据帧在空口上的占用时长
    pub fn frame_duration(&self, payload_bytes: u32) -> SimTime {
        let bytes = payload_bytes.saturating_add(self.mac_header_bytes);
        SimTime::from_micros(self.preamble_us).saturating_add(self.serialization_time(bytes))
    }

    pub fn ack_duration(&self) -> SimTime {
        SimTime::from_micros(self.preamble_us).saturating_add(self.serialization_time(self.ack_bytes))
    }

    /// 发送方等待 ACK 的超时：SIFS + ACK + 一个 slot
    pub fn ack_timeout(&self) -> SimTime {
        self.sifs()
            .saturating_add(self.ack_duration())
            .saturating_add(self.slot())
    }
}
