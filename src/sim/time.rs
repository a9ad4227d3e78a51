//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。

/// 仿真时间（纳秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    /// 从浮点秒数构造（四舍五入到纳秒；负数与 NaN 视为 0）
    pub fn from_secs_f64(s: f64) -> SimTime {
        let nanos = (s * 1e9).round();
        if nanos.is_nan() || nanos <= 0.0 {
            return SimTime::ZERO;
        }
        if nanos >= u64::MAX as f64 {
            return SimTime(u64::MAX);
        }
        SimTime(nanos as u64)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }

    pub fn as_micros_f64(self) -> f64 {
        self.0 as f64 / 1e3
    }

    pub fn saturating_add(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(other.0))
    }
}
