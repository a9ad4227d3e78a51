//! 场景配置
//!
//! 一个结构体列出构建"一个 AP + N 个 STA"场景所需的全部参数。所有字段都有默认值，
//! 因此 JSON 配置文件只需写出要覆盖的部分。

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::SimTime;
use crate::wifi::{ChannelConfig, MacConfig, OnOffConfig, PhyConfig, Position};

/// 第一个 STA 的端口号，第 i 个 STA 使用 `BASE_PORT + i`
pub const BASE_PORT: u16 = 8000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 仿真时长（秒）
    pub simulation_time_s: f64,
    pub sta_count: u32,
    /// run 编号：在同一 seed 下切换随机序列
    pub run: u64,
    pub seed: u64,
    /// 每个 STA 的上行应用速率（bps）
    pub data_rate_bps: u64,
    /// 应用层包大小（字节）
    pub packet_size: u32,
    pub app_start_s: f64,
    /// None 表示 `simulation_time_s + 1`
    pub app_stop_s: Option<f64>,
    pub on_time_s: f64,
    /// 0 表示一直处于 on
    pub off_time_s: f64,
    pub ap_position: Position,
    /// 所有 STA 共用的位置
    pub sta_position: Position,
    pub channel: ChannelConfig,
    pub phy: PhyConfig,
    pub mac: MacConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            simulation_time_s: 10.0,
            sta_count: 1,
            run: 1,
            seed: 1,
            data_rate_bps: 5_000_000,
            packet_size: 1024,
            app_start_s: 1.0,
            app_stop_s: None,
            on_time_s: 1.0,
            off_time_s: 0.0,
            ap_position: Position::new(0.0, 0.0, 3.0),
            sta_position: Position::new(3.0, 3.0, 0.0),
            channel: ChannelConfig::default(),
            phy: PhyConfig::default(),
            mac: MacConfig::default(),
        }
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::Configuration(format!("{name} must be positive, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::Configuration(format!("{name} must not be negative, got {v}")))
    }
}

impl ScenarioConfig {
    /// 在仿真开始前检查所有参数
    pub fn validate(&self) -> Result<()> {
        positive("simulation time", self.simulation_time_s)?;
        if self.packet_size == 0 {
            return Err(Error::Configuration("packet size must be positive".into()));
        }
        if self.data_rate_bps == 0 {
            return Err(Error::Configuration("data rate must be positive".into()));
        }
        // 地址从 192.168.0.1 开始顺序分配
        if self.sta_count >= u16::MAX as u32 - 1 {
            return Err(Error::Configuration(format!(
                "too many stations: {}",
                self.sta_count
            )));
        }
        if BASE_PORT as u32 + self.sta_count > u16::MAX as u32 {
            return Err(Error::Configuration("station ports exceed u16 range".into()));
        }
        non_negative("app start", self.app_start_s)?;
        if self.app_stop_s() <= self.app_start_s {
            return Err(Error::Configuration(format!(
                "app stop ({}) must be after app start ({})",
                self.app_stop_s(),
                self.app_start_s
            )));
        }
        positive("on time", self.on_time_s)?;
        non_negative("off time", self.off_time_s)?;
        self.channel.validate()?;
        self.phy.validate()?;
        self.mac.validate()?;
        Ok(())
    }

    pub fn app_stop_s(&self) -> f64 {
        self.app_stop_s.unwrap_or(self.simulation_time_s + 1.0)
    }

    pub fn stop_time(&self) -> SimTime {
        SimTime::from_secs_f64(self.simulation_time_s)
    }

    /// 每个 STA 上流量源的配置
    pub fn on_off(&self) -> OnOffConfig {
        OnOffConfig {
            packet_size: self.packet_size,
            data_rate_bps: self.data_rate_bps,
            on_time: SimTime::from_secs_f64(self.on_time_s),
            off_time: SimTime::from_secs_f64(self.off_time_s),
            start: SimTime::from_secs_f64(self.app_start_s),
            stop: SimTime::from_secs_f64(self.app_stop_s()),
        }
    }

    /// 从 JSON 文本解析
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// 解析 ns-3 风格的速率字符串，如 `5Mbps`、`500Kbps`、`100kbps`、`1Gbps`、`9600bps`、`2000000`
pub fn parse_data_rate(raw: &str) -> Result<u64> {
    let s = raw.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let value: f64 = num
        .parse()
        .map_err(|_| Error::Configuration(format!("invalid data rate: {raw:?}")))?;
    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "bps" | "b/s" => 1.0,
        "kbps" | "kb/s" => 1e3,
        "mbps" | "mb/s" => 1e6,
        "gbps" | "gb/s" => 1e9,
        _ => {
            return Err(Error::Configuration(format!(
                "unknown data rate unit in {raw:?}"
            )));
        }
    };
    let bps = (value * multiplier).round();
    if !(bps.is_finite() && bps >= 1.0) {
        return Err(Error::Configuration(format!("data rate must be positive: {raw:?}")));
    }
    Ok(bps as u64)
}
