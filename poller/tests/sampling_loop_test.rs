mod helpers;

use db::models::server_metric::Model as ServerMetricModel;
use db::test_utils::setup_test_db;
use poller::error::PollerError;
use poller::sampler::Poller;
use sea_orm::DatabaseConnection;

use helpers::{FakeClock, FakeEnergy, FakeSource};

const START: f64 = 1_760_600_002.3;
const PERIOD: f64 = 5.0;
const FIRST_SLOT_MS: i64 = 1_760_600_005_000;

async fn poller_with(
    clock: &FakeClock,
    source: FakeSource,
    energy: FakeEnergy,
) -> Poller<FakeClock, FakeSource, FakeEnergy, DatabaseConnection> {
    let db = setup_test_db().await;
    Poller::new(clock.clone(), source, energy, db, PERIOD, "/").unwrap()
}

#[tokio::test]
async fn consecutive_ticks_form_an_arithmetic_sequence() {
    let clock = FakeClock::at(START);
    let mut poller = poller_with(&clock, FakeSource::new(clock.clone()), FakeEnergy::absent()).await;

    let mut emitted = Vec::new();
    for _ in 0..6 {
        emitted.push(poller.tick().await.unwrap().slot_ts);
    }

    assert_eq!(emitted[0], FIRST_SLOT_MS);
    for pair in emitted.windows(2) {
        assert_eq!(pair[1] - pair[0], 5_000);
    }

    let stored = ServerMetricModel::recent(poller.sink(), 100).await.unwrap();
    let mut stored_ts: Vec<i64> = stored.iter().map(|r| r.ts).collect();
    stored_ts.sort();
    assert_eq!(stored_ts, emitted);
}

#[tokio::test]
async fn network_rates_use_elapsed_wall_time() {
    let clock = FakeClock::at(START);
    let mut poller = poller_with(&clock, FakeSource::new(clock.clone()), FakeEnergy::absent()).await;

    // baseline was read 2.7s before the first boundary
    let first = poller.tick().await.unwrap();
    assert!((first.net_up - 5_000.0 / 2.7).abs() < 1e-3);

    let second = poller.tick().await.unwrap();
    assert!((second.net_up - 1_000.0).abs() < 1e-9);
    assert!((second.net_dn - 2_000.0).abs() < 1e-9);
}

#[tokio::test]
async fn stall_resyncs_instead_of_bursting() {
    let clock = FakeClock::at(START);
    let mut source = FakeSource::new(clock.clone());
    // second tick takes 27.4s to read the CPU
    source.stall_on_tick = Some((1, 27.4));
    let mut poller = poller_with(&clock, source, FakeEnergy::absent()).await;

    let a = poller.tick().await.unwrap();
    let b = poller.tick().await.unwrap();
    let c = poller.tick().await.unwrap();
    let d = poller.tick().await.unwrap();

    assert_eq!(a.slot_ts, FIRST_SLOT_MS);
    assert_eq!(b.slot_ts, FIRST_SLOT_MS + 5_000);
    // the overdue tick fires at once, labelled with the slot it actually ran in
    assert_eq!(c.slot_ts, FIRST_SLOT_MS + 30_000);
    // then the grid resumes; slots 10s..25s are dropped
    assert_eq!(d.slot_ts, FIRST_SLOT_MS + 35_000);
    assert!((poller.scheduler().next_target() - (START + 2.7 + 40.0)).abs() < 1e-6);
}

#[tokio::test]
async fn power_appears_from_the_second_reading() {
    let clock = FakeClock::at(START);
    // 25 J every 5s
    let energy = FakeEnergy::stepping(25_000_000);
    let mut poller = poller_with(&clock, FakeSource::new(clock.clone()), energy).await;

    let first = poller.tick().await.unwrap();
    let second = poller.tick().await.unwrap();

    assert_eq!(first.pwr_used, None);
    assert!((second.pwr_used.unwrap() - 5.0).abs() < 1e-6);

    let row = ServerMetricModel::find_by_ts(poller.sink(), first.slot_ts)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.pwr_used, None);
}

#[tokio::test]
async fn missing_sensors_still_write_a_row() {
    let clock = FakeClock::at(START);
    let mut source = FakeSource::new(clock.clone());
    source.temps = None;
    let mut poller = poller_with(&clock, source, FakeEnergy::absent()).await;

    poller.tick().await.unwrap();
    let sample = poller.tick().await.unwrap();
    assert_eq!(sample.cpu_temp, None);
    assert_eq!(sample.pwr_used, None);

    let row = ServerMetricModel::find_by_ts(poller.sink(), sample.slot_ts)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.cpu_temp, None);
    assert_eq!(row.cpu_used, 12.5);
    assert_eq!(row.disk_used, 63.0);
}

#[tokio::test]
async fn temperature_prefers_package_sensor() {
    let clock = FakeClock::at(START);
    let mut poller = poller_with(&clock, FakeSource::new(clock.clone()), FakeEnergy::absent()).await;

    let sample = poller.tick().await.unwrap();
    assert_eq!(sample.cpu_temp, Some(55.0));
}

#[tokio::test]
async fn disk_failure_is_fatal_and_writes_nothing() {
    let clock = FakeClock::at(START);
    let mut source = FakeSource::new(clock.clone());
    source.disk = Err("gone".into());
    let mut poller = poller_with(&clock, source, FakeEnergy::absent()).await;

    let err = poller.tick().await.unwrap_err();
    assert!(matches!(err, PollerError::Metrics(_)));

    let run_err = poller.run().await;
    assert!(run_err.is_err());

    let stored = ServerMetricModel::recent(poller.sink(), 10).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn replayed_slot_after_restart_keeps_first_row() {
    let db = setup_test_db().await;

    let clock = FakeClock::at(START);
    let mut first = Poller::new(
        clock.clone(),
        FakeSource::new(clock.clone()),
        FakeEnergy::absent(),
        db.clone(),
        PERIOD,
        "/",
    )
    .unwrap();
    let a = first.tick().await.unwrap();

    // restarted process whose clock reads the same instant again
    let restarted_clock = FakeClock::at(START);
    let mut source = FakeSource::new(restarted_clock.clone());
    source.cpu = 99.0;
    let mut second = Poller::new(
        restarted_clock.clone(),
        source,
        FakeEnergy::absent(),
        db.clone(),
        PERIOD,
        "/",
    )
    .unwrap();
    let b = second.tick().await.unwrap();
    let c = second.tick().await.unwrap();

    assert_eq!(a.slot_ts, FIRST_SLOT_MS);
    assert_eq!(b.slot_ts, FIRST_SLOT_MS);
    assert_eq!(c.slot_ts, FIRST_SLOT_MS + 5_000);

    let row = ServerMetricModel::find_by_ts(&db, a.slot_ts).await.unwrap().unwrap();
    assert_eq!(row.cpu_used, 12.5);
    assert_eq!(ServerMetricModel::recent(&db, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn rejects_non_positive_period() {
    let db = setup_test_db().await;
    let clock = FakeClock::at(START);

    let result = Poller::new(
        clock.clone(),
        FakeSource::new(clock.clone()),
        FakeEnergy::absent(),
        db,
        0.0,
        "/",
    );
    assert!(matches!(result, Err(PollerError::Config(_))));
}

#[tokio::test]
async fn rejects_period_outside_supported_range() {
    for period in [0.0004, 1e20, f64::NAN] {
        let db = setup_test_db().await;
        let clock = FakeClock::at(START);

        let result = Poller::new(
            clock.clone(),
            FakeSource::new(clock.clone()),
            FakeEnergy::absent(),
            db,
            period,
            "/",
        );
        assert!(matches!(result, Err(PollerError::Config(_))), "period {period}");
    }
}

#[tokio::test]
async fn millisecond_period_keeps_distinct_slots() {
    let db = setup_test_db().await;
    let clock = FakeClock::at(START);
    let mut poller = Poller::new(
        clock.clone(),
        FakeSource::new(clock.clone()),
        FakeEnergy::absent(),
        db,
        0.001,
        "/",
    )
    .unwrap();

    let mut emitted = Vec::new();
    for _ in 0..4 {
        emitted.push(poller.tick().await.unwrap().slot_ts);
    }
    for pair in emitted.windows(2) {
        assert_eq!(pair[1] - pair[0], 1);
    }
}
