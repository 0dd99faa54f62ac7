use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use daynight::appearance::{AppearancePair, MemoryAppearance};
use daynight::controller::{TickOutcome, ToggleController};
use daynight::daemon;
use daynight::schedule::{FixedClock, Window};
use daynight::settings::Settings;
use daynight::state::ToggleState;
use daynight::storage::{JsonSettingsStore, SettingsStore};

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn temp_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let dir = std::env::temp_dir().join(format!(
        "daynight-it-{label}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn light() -> AppearancePair {
    AppearancePair::new("Adwaita", "prefer-light")
}

fn dark() -> AppearancePair {
    AppearancePair::new("Adwaita-dark", "prefer-dark")
}

fn write_settings(dir: &Path) -> JsonSettingsStore {
    let store = JsonSettingsStore::in_dir(dir);
    fs::write(
        store.path(),
        r#"{
            "pluginEnabled": true,
            "dayTheme": "Adwaita",
            "dayColorScheme": "prefer-light",
            "dayTime": "10:00",
            "nightTheme": "Adwaita-dark",
            "nightColorScheme": "prefer-dark",
            "nightTime": "15:00"
        }"#,
    )
    .unwrap();
    store
}

#[test]
fn schedule_follows_the_clock_through_a_day() {
    let dir = temp_dir("cycle");
    let store = write_settings(&dir);
    let host = MemoryAppearance::new(light());
    let mut ctl = ToggleController::load(&host, &store).unwrap();

    let expectations = [
        (hm(8, 0), Window::Night),
        (hm(10, 0), Window::Day),
        (hm(12, 0), Window::Day),
        (hm(15, 0), Window::Night),
        (hm(23, 59), Window::Night),
    ];
    for (now, window) in expectations {
        ctl.tick(now).unwrap();
        assert_eq!(host.pair(), ctl.settings().pair_for(window), "at {now}");
    }

    let persisted = store.load().unwrap();
    assert_eq!(persisted.cached_pair(), dark());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn manual_toggle_survives_exactly_one_confirming_tick() {
    let dir = temp_dir("toggle");
    let store = write_settings(&dir);
    let host = MemoryAppearance::new(light());
    let mut ctl = ToggleController::load(&host, &store).unwrap();

    assert_eq!(
        ctl.tick(hm(12, 0)).unwrap(),
        TickOutcome::Unchanged { window: Window::Day }
    );

    assert_eq!(ctl.manual_toggle().unwrap(), Window::Night);
    assert_eq!(host.pair(), dark());
    assert!(store.load().unwrap().pause_theme_toggle);

    assert_eq!(
        ctl.tick(hm(12, 0)).unwrap(),
        TickOutcome::Resumed { window: Window::Day }
    );
    assert_eq!(host.pair(), dark());
    assert!(!store.load().unwrap().pause_theme_toggle);

    assert!(ctl.tick(hm(12, 0)).unwrap().applied());
    assert_eq!(host.pair(), light());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn toggle_written_by_another_process_is_honoured_by_running_loop() {
    let dir = temp_dir("external");
    let store = write_settings(&dir);
    let host = MemoryAppearance::new(light());
    let mut ctl = ToggleController::load(&host, &store).unwrap();

    // A one-shot `toggle` elsewhere paused the schedule and left the host dark.
    let mut edited: Settings = store.load().unwrap();
    edited.pause_theme_toggle = true;
    store.save(&edited).unwrap();
    host.set_externally(dark());
    ctl.reload().unwrap();
    assert_eq!(ctl.state(), ToggleState::Paused);

    let (handle, rx) = daemon::channel();
    handle.shutdown();
    daemon::run_loop(
        &mut ctl,
        &FixedClock(hm(12, 0)),
        Duration::from_secs(3600),
        &rx,
        |_, _| {},
    )
    .unwrap();

    assert_eq!(ctl.state(), ToggleState::Active);
    assert_eq!(host.pair(), dark());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn disabled_settings_leave_host_untouched_across_the_day() {
    let dir = temp_dir("disabled");
    let store = JsonSettingsStore::in_dir(&dir);
    let host = MemoryAppearance::new(light());
    let mut ctl = ToggleController::load(&host, &store).unwrap();

    for hour in 0..24 {
        assert_eq!(ctl.tick(hm(hour, 0)).unwrap(), TickOutcome::Disabled);
    }
    assert!(!host.was_called());
    assert!(!store.path().exists());
    let _ = fs::remove_dir_all(dir);
}
