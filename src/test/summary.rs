use std::net::Ipv4Addr;

use crate::error::Error;
use crate::flowmon::{FlowKey, FlowRecord, FlowSnapshot, FlowStats, summarize, throughput_mbps};
use crate::sim::SimTime;
use crate::wifi::FlowId;

const AP: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 1);

fn flow(id: u32, src: Ipv4Addr, rx_bytes: u64, rx_packets: u64, delay_sum: SimTime) -> FlowStats {
    FlowStats {
        flow_id: FlowId(id),
        key: FlowKey {
            src_addr: src,
            dst_addr: AP,
            dst_port: 8000,
        },
        record: FlowRecord {
            tx_bytes: rx_bytes,
            tx_packets: rx_packets,
            rx_bytes,
            rx_packets,
            delay_sum,
            ..FlowRecord::default()
        },
    }
}

fn sta(i: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 0, 2 + i)
}

fn snapshot(flows: Vec<FlowStats>) -> FlowSnapshot {
    FlowSnapshot {
        flows,
        taken_at: SimTime::from_secs(10),
    }
}

#[test]
fn single_flow_throughput_in_mbps() {
    assert_eq!(throughput_mbps(655_360, 10.0), 0.524288);

    let snap = snapshot(vec![flow(1, sta(0), 655_360, 640, SimTime::from_micros(640_000))]);
    let s = summarize(&snap, AP, 10.0).expect("summary");
    assert_eq!(s.count, 1);
    assert_eq!(s.sum, 0.524288);
    assert_eq!(s.mean, 0.524288);
    assert_eq!(s.variance, 0.0);
    assert_eq!(s.std, 0.0);
    assert_eq!(s.flows[0].avg_delay_us, 1_000.0);
}

#[test]
fn population_variance_over_flows() {
    // 2 Mbps 与 4 Mbps，10 秒
    let snap = snapshot(vec![
        flow(1, sta(0), 2_500_000, 1, SimTime::ZERO),
        flow(2, sta(1), 5_000_000, 1, SimTime::ZERO),
    ]);
    let s = summarize(&snap, AP, 10.0).expect("summary");
    assert_eq!(s.count, 2);
    assert_eq!(s.sum, 6.0);
    assert_eq!(s.mean, 3.0);
    assert_eq!(s.variance, 1.0);
    assert_eq!(s.std, 1.0);
}

#[test]
fn flows_sourced_at_the_ap_are_excluded() {
    let snap = snapshot(vec![
        flow(1, AP, 9_000_000, 10, SimTime::ZERO),
        flow(2, sta(0), 1_250_000, 10, SimTime::ZERO),
    ]);
    let s = summarize(&snap, AP, 10.0).expect("summary");
    assert_eq!(s.count, 1);
    assert_eq!(s.flows[0].flow_id, FlowId(2));
    assert_eq!(s.sum, 1.0);
}

#[test]
fn no_eligible_flows_is_an_error() {
    let empty = snapshot(Vec::new());
    assert!(matches!(summarize(&empty, AP, 10.0), Err(Error::NoFlows)));

    let only_ap = snapshot(vec![flow(1, AP, 1_000, 1, SimTime::ZERO)]);
    assert!(matches!(summarize(&only_ap, AP, 10.0), Err(Error::NoFlows)));
}

#[test]
fn zero_received_flow_counts_with_nan_delay() {
    let snap = snapshot(vec![
        flow(1, sta(0), 0, 0, SimTime::ZERO),
        flow(2, sta(1), 2_500_000, 1, SimTime::ZERO),
    ]);
    let s = summarize(&snap, AP, 10.0).expect("summary");
    assert_eq!(s.count, 2);
    assert!(s.flows[0].avg_delay_us.is_nan());
    assert_eq!(s.flows[0].throughput_mbps, 0.0);
    assert_eq!(s.mean, 1.0);
    assert_eq!(s.variance, 1.0);
}

#[test]
fn non_positive_duration_is_rejected() {
    let snap = snapshot(vec![flow(1, sta(0), 1_000, 1, SimTime::ZERO)]);
    assert!(matches!(
        summarize(&snap, AP, 0.0),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        summarize(&snap, AP, f64::NAN),
        Err(Error::Configuration(_))
    ));
}
