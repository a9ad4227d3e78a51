//! 批量参数扫描
//!
//! 对 (包大小 × 应用速率 × STA 数 × run 编号) 的网格逐一运行场景，
//! 结果按 `<out_dir>/<包大小>_<速率>.csv` 分文件追加。最多同时运行 `max_jobs` 个场景，
//! 每个场景拥有独立的仿真器与世界，线程之间不共享任何状态。

use std::path::PathBuf;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::{ScenarioConfig, parse_data_rate};
use super::report::append_csv_row;
use super::run_scenario;
use crate::error::{Error, Result};
use crate::flowmon::ThroughputSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepSpec {
    /// ns-3 风格速率字符串，同时用作输出文件名的一部分
    pub data_rates: Vec<String>,
    pub packet_sizes: Vec<u32>,
    /// STA 数范围 `[sta_min, sta_max)`
    pub sta_min: u32,
    pub sta_max: u32,
    /// 每个组合运行的 run 编号 `[0, runs)`
    pub runs: u64,
    pub max_jobs: usize,
    pub out_dir: PathBuf,
    /// 其余参数
    pub base: ScenarioConfig,
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            data_rates: ["5Mbps", "2Mbps", "1Mbps", "500Kbps", "100Kbps"]
                .into_iter()
                .map(String::from)
                .collect(),
            packet_sizes: vec![512, 1024],
            sta_min: 1,
            sta_max: 40,
            runs: 5,
            max_jobs: 4,
            out_dir: PathBuf::from("results"),
            base: ScenarioConfig::default(),
        }
    }
}

/// 一个待运行的场景及其结果文件
#[derive(Debug, Clone)]
pub struct SweepJob {
    pub cfg: ScenarioConfig,
    pub out_file: PathBuf,
}

/// 扫描结果计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl SweepSpec {
    /// 展开为有序的场景列表
    pub fn jobs(&self) -> Result<Vec<SweepJob>> {
        let mut jobs = Vec::new();
        for &ps in &self.packet_sizes {
            for dr in &self.data_rates {
                let rate = parse_data_rate(dr)?;
                let out_file = self.out_dir.join(format!("{ps}_{dr}.csv"));
                for stas in self.sta_min..self.sta_max {
                    for run in 0..self.runs {
                        let mut cfg = self.base.clone();
                        cfg.packet_size = ps;
                        cfg.data_rate_bps = rate;
                        cfg.sta_count = stas;
                        cfg.run = run;
                        jobs.push(SweepJob {
                            cfg,
                            out_file: out_file.clone(),
                        });
                    }
                }
            }
        }
        Ok(jobs)
    }
}

fn run_job(job: &SweepJob) -> Result<ThroughputSummary> {
    run_scenario(&job.cfg)?.summarize()
}

/// 运行整个扫描；单个场景失败只计数，不中止其它场景
pub fn run_sweep(spec: &SweepSpec) -> Result<SweepOutcome> {
    if spec.max_jobs == 0 {
        return Err(Error::Configuration("max_jobs must be positive".into()));
    }
    let jobs = spec.jobs()?;
    info!(jobs = jobs.len(), max_jobs = spec.max_jobs, "开始批量扫描");

    let mut outcome = SweepOutcome::default();
    for batch in jobs.chunks(spec.max_jobs) {
        let results: Vec<Option<Result<ThroughputSummary>>> = thread::scope(|s| {
            let handles: Vec<_> = batch.iter().map(|job| s.spawn(move || run_job(job))).collect();
            handles.into_iter().map(|h| h.join().ok()).collect()
        });

        // 按作业顺序写入，保证输出文件内容与并发度无关
        for (job, result) in batch.iter().zip(results) {
            match result {
                Some(Ok(summary)) => {
                    append_csv_row(
                        &job.out_file,
                        job.cfg.simulation_time_s,
                        job.cfg.sta_count,
                        &summary,
                    )?;
                    outcome.succeeded += 1;
                }
                Some(Err(err)) => {
                    warn!(stas = job.cfg.sta_count, run = job.cfg.run, %err, "Some run failed!");
                    outcome.failed += 1;
                }
                None => {
                    warn!(stas = job.cfg.sta_count, run = job.cfg.run, "run panicked");
                    outcome.failed += 1;
                }
            }
        }
    }

    info!(succeeded = outcome.succeeded, failed = outcome.failed, "批量扫描完成");
    Ok(outcome)
}
