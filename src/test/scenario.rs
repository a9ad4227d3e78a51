use crate::error::Error;
use crate::scenario::{ScenarioConfig, build_infrastructure, run_scenario};
use crate::sim::{SimTime, Simulator};
use crate::wifi::{LossModelConfig, MacConfig, MacState, Position};

fn short(stas: u32) -> ScenarioConfig {
    ScenarioConfig {
        simulation_time_s: 3.0,
        sta_count: stas,
        seed: 7,
        run: 1,
        ..ScenarioConfig::default()
    }
}

#[test]
fn same_seed_and_run_reproduce_the_same_report() {
    let cfg = short(4);
    let a = run_scenario(&cfg).expect("run a");
    let b = run_scenario(&cfg).expect("run b");
    assert_eq!(a, b);
    assert_eq!(a.summarize().expect("a").sum, b.summarize().expect("b").sum);
}

#[test]
fn lightly_loaded_single_station_delivers_everything() {
    let cfg = ScenarioConfig {
        data_rate_bps: 100_000,
        packet_size: 512,
        app_stop_s: Some(2.5),
        ..short(1)
    };
    let report = run_scenario(&cfg).expect("run");
    let summary = report.summarize().expect("summary");
    assert_eq!(summary.count, 1);

    let f = &summary.flows[0];
    assert!(f.tx_bytes > 0);
    assert_eq!(f.rx_bytes, f.tx_bytes);
    assert_eq!(f.lost_packets, 0);
    assert_eq!(report.collisions, 0);

    // 时延至少包含 DIFS 与一个数据帧的空口时间
    let floor = cfg.phy.difs().saturating_add(cfg.phy.frame_duration(512));
    assert!(f.avg_delay_us >= floor.as_micros_f64());
}

#[test]
fn zero_contention_window_makes_stations_collide_forever() {
    let cfg = ScenarioConfig {
        mac: MacConfig {
            cw_min: 0,
            cw_max: 0,
            ..MacConfig::default()
        },
        ..short(2)
    };
    let report = run_scenario(&cfg).expect("run");
    let summary = report.summarize().expect("summary");

    assert_eq!(summary.count, 2);
    assert_eq!(summary.sum, 0.0);
    for f in &summary.flows {
        assert!(f.tx_bytes > 0);
        assert_eq!(f.rx_bytes, 0);
        assert!(f.lost_packets > 0);
        assert!(f.avg_delay_us.is_nan());
    }
    assert!(report.collisions > 0);
    let retry_drops: u64 = report.mac_counters.iter().map(|(_, c)| c.retry_drops).sum();
    assert!(retry_drops > 0);
    assert!(report.mac_counters.iter().all(|(_, c)| c.successes == 0));
}

#[test]
fn signal_below_sensitivity_delivers_nothing() {
    let mut cfg = short(1);
    cfg.channel.loss = LossModelConfig::FixedRss { rss_dbm: -95.0 };
    let report = run_scenario(&cfg).expect("run");
    let summary = report.summarize().expect("summary");
    assert_eq!(summary.flows[0].rx_bytes, 0);
    assert!(summary.flows[0].lost_packets > 0);
    assert_eq!(report.collisions, 0);
}

#[test]
fn far_station_under_log_distance_is_out_of_range() {
    let mut cfg = short(1);
    cfg.channel.loss = LossModelConfig::LogDistance {
        exponent: 3.0,
        reference_distance_m: 1.0,
        reference_loss_db: 46.6777,
    };
    cfg.sta_position = Position::new(2_000.0, 0.0, 0.0);
    let report = run_scenario(&cfg).expect("run");
    assert_eq!(report.summarize().expect("summary").sum, 0.0);

    cfg.sta_position = Position::new(10.0, 0.0, 0.0);
    let report = run_scenario(&cfg).expect("run");
    assert!(report.summarize().expect("summary").sum > 0.0);
}

#[test]
fn total_throughput_is_bounded_by_phy_rate() {
    let report = run_scenario(&short(8)).expect("run");
    let summary = report.summarize().expect("summary");
    assert_eq!(summary.count, 8);
    assert!(summary.sum > 0.0);
    assert!(summary.sum < 11.0);
    // 竞争下每个 STA 都能拿到一部分信道
    assert!(summary.flows.iter().all(|f| f.rx_bytes > 0));
}

#[test]
fn on_off_source_is_silent_during_off_periods() {
    let always_on = run_scenario(&ScenarioConfig {
        data_rate_bps: 200_000,
        ..short(1)
    })
    .expect("run");
    let half_on = run_scenario(&ScenarioConfig {
        data_rate_bps: 200_000,
        on_time_s: 0.5,
        off_time_s: 0.5,
        ..short(1)
    })
    .expect("run");

    let tx = |r: &crate::scenario::ScenarioReport| r.snapshot.flows[0].record.tx_packets;
    // 2 秒内约 48 个包，on/off 各半时约一半
    let (full, half) = (tx(&always_on), tx(&half_on));
    assert!(full >= 45);
    assert!(half >= full / 2 - 2 && half <= full / 2 + 2);
}

#[test]
fn no_stations_means_no_flows() {
    let report = run_scenario(&short(0)).expect("run");
    assert!(report.snapshot.flows.is_empty());
    assert!(matches!(report.summarize(), Err(Error::NoFlows)));
}

#[test]
fn invalid_config_fails_before_running() {
    let cfg = ScenarioConfig {
        packet_size: 0,
        ..short(1)
    };
    assert!(matches!(run_scenario(&cfg), Err(Error::Configuration(_))));
}

#[test]
fn macs_return_to_idle_after_traffic_stops() {
    let cfg = ScenarioConfig {
        data_rate_bps: 100_000,
        app_stop_s: Some(2.0),
        ..short(3)
    };
    let mut infra = build_infrastructure(&cfg).expect("build");
    let mut sim = Simulator::default();
    infra.world.schedule_apps(&mut sim).expect("schedule");
    sim.run_until(cfg.stop_time(), &mut infra.world).expect("run");

    assert_eq!(sim.now(), SimTime::from_secs(3));
    for sta in &infra.stas {
        let mac = infra.world.mac(*sta).expect("mac");
        assert_eq!(mac.state(), MacState::Idle);
        assert_eq!(mac.queue_len(), 0);
    }
    assert!(infra.world.apps.iter().all(|a| !a.is_running()));
    assert_eq!(
        infra.world.sink.total_rx_bytes(),
        infra.world.apps.iter().map(|a| a.sent_bytes).sum::<u64>()
    );
}
