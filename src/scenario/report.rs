//! 结果输出
//!
//! - CSV：每次运行追加一行 `time,stas,sum,mean,variance,std`，无表头
//! - 诊断：逐 flow 的收发字节、吞吐、平均时延，以及总览，写到可读的输出流

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::flowmon::ThroughputSummary;

/// 一行 CSV（含换行）
pub fn csv_row(simulation_time_s: f64, sta_count: u32, summary: &ThroughputSummary) -> String {
    format!(
        "{},{},{},{},{},{}\n",
        simulation_time_s, sta_count, summary.sum, summary.mean, summary.variance, summary.std
    )
}

/// 以追加模式写入一行；文件不存在时创建
pub fn append_csv_row(
    path: &Path,
    simulation_time_s: f64,
    sta_count: u32,
    summary: &ThroughputSummary,
) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(csv_row(simulation_time_s, sta_count, summary).as_bytes())?;
    Ok(())
}

pub fn write_flow_diagnostics<W: Write>(out: &mut W, summary: &ThroughputSummary) -> io::Result<()> {
    for f in &summary.flows {
        writeln!(
            out,
            "Flow {} ({} -> {})",
            f.flow_id.0, f.key.src_addr, f.key.dst_addr
        )?;
        writeln!(out, "  Tx Bytes:   {}", f.tx_bytes)?;
        writeln!(out, "  Rx Bytes:   {}", f.rx_bytes)?;
        writeln!(out, "  Lost Packets: {}", f.lost_packets)?;
        writeln!(out, "  Throughput: {} Mbps", f.throughput_mbps)?;
        writeln!(out, "  Delay average: {} us", f.avg_delay_us)?;
    }
    Ok(())
}

pub fn write_overview<W: Write>(
    out: &mut W,
    simulation_time_s: f64,
    sta_count: u32,
    summary: &ThroughputSummary,
) -> io::Result<()> {
    writeln!(out, "Overview:")?;
    writeln!(out, "  Time:   {simulation_time_s}")?;
    writeln!(out, "  STA count:   {sta_count}")?;
    writeln!(out, "  Throughput sum:     {}", summary.sum)?;
    writeln!(out, "  Throughput mean:     {}", summary.mean)?;
    writeln!(out, "  Throughput variance: {}", summary.variance)?;
    writeln!(out, "  Throughput std:      {}", summary.std)?;
    Ok(())
}
