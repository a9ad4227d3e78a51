use crate::sim::SimTime;
use crate::wifi::{
    ChannelConfig, ChannelModel, LossModelConfig, NodeId, Position, Topology,
    dsss_sensitivity_dbm,
};

fn two_nodes(distance_m: f64) -> Topology {
    let mut topo = Topology::default();
    topo.place(NodeId(0), Position::new(0.0, 0.0, 0.0)).expect("place");
    topo.place(NodeId(1), Position::new(distance_m, 0.0, 0.0)).expect("place");
    topo
}

#[test]
fn sensitivity_follows_dsss_rate_table() {
    assert_eq!(dsss_sensitivity_dbm(1_000_000), -94.0);
    assert_eq!(dsss_sensitivity_dbm(2_000_000), -91.0);
    assert_eq!(dsss_sensitivity_dbm(5_500_000), -89.0);
    assert_eq!(dsss_sensitivity_dbm(11_000_000), -85.0);

    let channel = ChannelModel::new(&ChannelConfig::default(), 11_000_000);
    assert_eq!(channel.sensitivity_dbm(), -85.0);

    let cfg = ChannelConfig {
        sensitivity_dbm: Some(-70.0),
        ..ChannelConfig::default()
    };
    assert_eq!(ChannelModel::new(&cfg, 11_000_000).sensitivity_dbm(), -70.0);
}

#[test]
fn fixed_rss_delivers_regardless_of_distance() {
    let channel = ChannelModel::new(&ChannelConfig::default(), 11_000_000);
    for d in [0.5, 5.0, 5_000.0] {
        let budget = channel
            .link_budget(&two_nodes(d), NodeId(0), NodeId(1))
            .expect("budget");
        assert_eq!(budget.rx_power_dbm, -80.0);
        assert!(budget.delivered);
        assert!(channel.can_sense(&budget));
    }
}

#[test]
fn fixed_rss_below_sensitivity_is_not_delivered() {
    let cfg = ChannelConfig {
        loss: LossModelConfig::FixedRss { rss_dbm: -90.0 },
        ..ChannelConfig::default()
    };
    let channel = ChannelModel::new(&cfg, 11_000_000);
    let budget = channel
        .link_budget(&two_nodes(1.0), NodeId(0), NodeId(1))
        .expect("budget");
    assert!(!budget.delivered);
    // 低于灵敏度但仍高于 CCA 门限，依然会让介质忙
    assert!(channel.can_sense(&budget));
}

#[test]
fn log_distance_loses_thirty_db_per_decade() {
    let cfg = ChannelConfig {
        loss: LossModelConfig::LogDistance {
            exponent: 3.0,
            reference_distance_m: 1.0,
            reference_loss_db: 46.6777,
        },
        tx_power_dbm: 16.0206,
        ..ChannelConfig::default()
    };
    let channel = ChannelModel::new(&cfg, 11_000_000);
    let p1 = channel.rx_power_dbm(1.0);
    let p10 = channel.rx_power_dbm(10.0);
    let p100 = channel.rx_power_dbm(100.0);
    assert!((p1 - (16.0206 - 46.6777)).abs() < 1e-9);
    assert!((p1 - p10 - 30.0).abs() < 1e-9);
    assert!((p10 - p100 - 30.0).abs() < 1e-9);
    // 参考距离以内不再增加接收功率
    assert_eq!(channel.rx_power_dbm(0.1), p1);
}

#[test]
fn friis_loss_grows_with_square_of_distance() {
    let cfg = ChannelConfig {
        loss: LossModelConfig::Friis {
            frequency_hz: 2.4e9,
            system_loss: 1.0,
        },
        ..ChannelConfig::default()
    };
    let channel = ChannelModel::new(&cfg, 11_000_000);
    let p1 = channel.rx_power_dbm(1.0);
    let p2 = channel.rx_power_dbm(2.0);
    assert!((p1 - p2 - 20.0 * 2.0_f64.log10()).abs() < 1e-9);
    assert!(p1 < cfg.tx_power_dbm);
}

#[test]
fn propagation_delay_is_distance_over_speed() {
    let channel = ChannelModel::new(&ChannelConfig::default(), 11_000_000);
    assert_eq!(channel.propagation_delay(0.0), SimTime::ZERO);
    // 299.792458 m 恰好 1 µs
    assert_eq!(channel.propagation_delay(299.792458), SimTime(1_000));

    let budget = channel
        .link_budget(&two_nodes(0.0), NodeId(0), NodeId(1))
        .expect("budget");
    assert_eq!(budget.delay, SimTime::ZERO);
}

#[test]
fn loss_model_config_parses_tagged_json() {
    let cfg: ChannelConfig =
        serde_json::from_str(r#"{ "loss": { "kind": "log_distance", "exponent": 2.0 } }"#)
            .expect("parse");
    assert_eq!(
        cfg.loss,
        LossModelConfig::LogDistance {
            exponent: 2.0,
            reference_distance_m: 1.0,
            reference_loss_db: 46.6777,
        }
    );
    assert_eq!(cfg.cca_threshold_dbm, -99.0);
    assert!(cfg.validate().is_ok());

    let bad = ChannelConfig {
        propagation_speed_mps: 0.0,
        ..ChannelConfig::default()
    };
    assert!(bad.validate().is_err());
}
