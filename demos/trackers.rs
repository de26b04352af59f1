//! Drive slot-bound trackers from a scripted driver, with the server
//! address persisted through the flat config file.
//!
//! Usage: cargo run --example trackers

use owltrack::protocol::WireMarker;
use owltrack::{ClientSettings, ConfigStore, MarkerTracker, MockDriver, OwlClient};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

fn main() {
    env_logger::init();

    let mut config = ConfigStore::new();
    if let Err(err) = config.load(Path::new("traces.conf")) {
        eprintln!("config load failed: {}", err);
        std::process::exit(1);
    }

    let settings = ClientSettings {
        capture_rigids: false,
        capture_cameras: false,
        ..ClientSettings::default()
    };
    let mut client = OwlClient::new(MockDriver::new(), settings);
    client.on_attach(&mut config);
    client.on_start(&mut config);
    println!("server address: {}", client.settings().server_address);

    // One tracker per followed slot; refreshed on every notification.
    let trackers: Vec<Rc<RefCell<MarkerTracker>>> = (0..3)
        .map(|slot| Rc::new(RefCell::new(MarkerTracker::new(slot))))
        .collect();
    for tracker in &trackers {
        let tracker = tracker.clone();
        client.subscribe(move |frames| tracker.borrow_mut().refresh(frames));
    }

    client.poll(); // connect

    for tick in 0..10i32 {
        // Slot 1 drops out every other tick; its tracker holds the last
        // good position.
        let batch: Vec<WireMarker> = (0..3)
            .map(|slot| WireMarker {
                id: slot,
                frame: tick,
                x: slot as f32 * 100.0 + tick as f32,
                y: 50.0,
                z: 25.0,
                cond: if slot == 1 && tick % 2 == 1 { -1.0 } else { 1.0 },
                flag: 0,
            })
            .collect();
        client.driver_mut().push_markers(batch);
        client.poll();

        for tracker in &trackers {
            let tracker = tracker.borrow();
            let p = tracker.position();
            println!(
                "tick {:>2}  slot {}  active={:<5}  pos=[{:+7.1}, {:+5.1}, {:+5.1}]",
                tick,
                tracker.slot(),
                tracker.is_active(),
                p[0],
                p[1],
                p[2],
            );
        }
    }

    client.on_shutdown();
}
