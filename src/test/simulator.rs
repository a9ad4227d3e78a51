use crate::error::{Error, Result};
use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct DummyWorld {
    ticks: usize,
}

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        self.ticks = self.ticks.saturating_add(1);
    }
}

struct Push {
    id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for Push {
    fn execute(self: Box<Self>, _sim: &mut Simulator, _world: &mut dyn World) -> Result<()> {
        let Push { id, log } = *self;
        log.lock().expect("log lock").push(id);
        Ok(())
    }
}

struct PushThenScheduleNow {
    id: u32,
    next_id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for PushThenScheduleNow {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<()> {
        let PushThenScheduleNow { id, next_id, log } = *self;
        log.lock().expect("log lock").push(id);
        sim.schedule(sim.now(), Push { id: next_id, log })?;
        Ok(())
    }
}

/// 在执行时尝试调度到过去
struct ScheduleInPast;

impl Event for ScheduleInPast {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<()> {
        let log = Arc::new(Mutex::new(Vec::new()));
        sim.schedule(SimTime(1), Push { id: 0, log })?;
        Ok(())
    }
}

fn push(id: u32, log: &Arc<Mutex<Vec<u32>>>) -> Push {
    Push {
        id,
        log: Arc::clone(log),
    }
}

#[test]
fn scheduled_events_order_by_time_then_seq() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime(10), push(1, &log)).expect("schedule");
    sim.schedule(SimTime(5), push(2, &log)).expect("schedule");
    sim.schedule(SimTime(10), push(3, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[2, 1, 3]);
    assert_eq!(world.ticks, 3);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn same_time_events_run_in_insertion_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    for id in 0..16 {
        sim.schedule(SimTime(7), push(id, &log)).expect("schedule");
    }

    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    let expected: Vec<u32> = (0..16).collect();
    assert_eq!(&*log.lock().expect("log lock"), &expected);
}

#[test]
fn event_scheduled_at_same_time_inside_event_runs_after_current_event() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(
        SimTime::ZERO,
        PushThenScheduleNow {
            id: 1,
            next_id: 2,
            log: Arc::clone(&log),
        },
    )
    .expect("schedule");

    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.now(), SimTime::ZERO);
}

#[test]
fn scheduling_in_the_past_is_a_causality_error() {
    let mut sim = Simulator::default();
    sim.schedule(SimTime(5), ScheduleInPast).expect("schedule");

    let mut world = DummyWorld::default();
    let err = sim.run(&mut world).expect_err("must fail");
    assert!(matches!(
        err,
        Error::Causality {
            now: SimTime(5),
            at: SimTime(1)
        }
    ));
}

#[test]
fn cancelled_event_never_runs() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime(1), push(1, &log)).expect("schedule");
    let id = sim.schedule(SimTime(2), push(2, &log)).expect("schedule");
    sim.schedule(SimTime(3), push(3, &log)).expect("schedule");
    assert_eq!(sim.pending_events(), 3);

    assert!(sim.is_pending(id));
    assert!(sim.cancel(id));
    assert!(!sim.is_pending(id));
    // 重复取消是 no-op
    assert!(!sim.cancel(id));
    assert_eq!(sim.pending_events(), 2);

    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1, 3]);
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.pending_events(), 0);
}

#[test]
fn cancelling_an_executed_event_returns_false() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    let id = sim.schedule(SimTime(1), push(1, &log)).expect("schedule");
    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    assert!(!sim.cancel(id));
}

#[test]
fn schedule_in_is_relative_to_now() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();
    sim.run_until(SimTime(100), &mut world).expect("run");
    sim.schedule_in(SimTime(5), push(1, &log)).expect("schedule");
    sim.run(&mut world).expect("run");

    assert_eq!(sim.now(), SimTime(105));
    assert_eq!(&*log.lock().expect("log lock"), &[1]);
}

#[test]
fn run_until_skips_events_after_until_and_advances_time() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime::ZERO, push(1, &log)).expect("schedule");
    sim.schedule(SimTime(10), push(2, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    sim.run_until(SimTime(5), &mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert_eq!(world.ticks, 1);
    assert_eq!(sim.now(), SimTime(5));

    sim.run(&mut world).expect("run");
    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn run_until_executes_events_scheduled_exactly_at_until() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime(5), push(1, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    sim.run_until(SimTime(5), &mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert_eq!(world.ticks, 1);
    assert_eq!(sim.now(), SimTime(5));
}

#[test]
fn run_until_advances_time_even_if_there_are_no_events() {
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.run_until(SimTime(7), &mut world).expect("run");
    assert_eq!(sim.now(), SimTime(7));
    assert_eq!(world.ticks, 0);
}
