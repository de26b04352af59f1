//! Stream converted rigid-body poses from a scripted driver to stdout.
//!
//! Usage: cargo run --example stream

use owltrack::protocol::{WirePose, WireRigid};
use owltrack::{ClientSettings, MockDriver, OwlClient, Rigid};

fn main() {
    env_logger::init();

    let settings = ClientSettings {
        capture_markers: false,
        capture_cameras: false,
        space_scalar: 0.001, // millimetres → metres
        ..ClientSettings::default()
    };
    let mut client = OwlClient::new(MockDriver::new(), settings);

    client.subscribe(|frames| {
        for wire in frames.rigids() {
            let rigid = Rigid::from_wire(wire);
            println!(
                "rigid {:>2}  frame {:>4}  pos=[{:+.3}, {:+.3}, {:+.3}]  quat=[{:+.3}, {:+.3}, {:+.3}, {:+.3}]  cond={:.2}",
                rigid.id,
                rigid.frame,
                rigid.position[0],
                rigid.position[1],
                rigid.position[2],
                rigid.orientation.x,
                rigid.orientation.y,
                rigid.orientation.z,
                rigid.orientation.w,
                rigid.condition,
            );
        }
    });

    // First poll runs the connect handshake.
    client.poll();
    if !client.running() {
        eprintln!("connect failed: state {:?}", client.state());
        std::process::exit(1);
    }

    // Script one circling rigid body per tick and drain it.
    for tick in 0..20u32 {
        let angle = tick as f32 * 0.1;
        client.driver_mut().push_rigids(vec![WireRigid {
            id: 1,
            frame: tick as i32,
            pose: WirePose {
                px: 1000.0 * angle.cos(),
                py: 150.0,
                pz: 1000.0 * angle.sin(),
                rw: (angle / 2.0).cos(),
                rx: 0.0,
                ry: (angle / 2.0).sin(),
                rz: 0.0,
            },
            cond: 1.0,
            flag: 0,
        }]);
        client.poll();
    }

    client.on_shutdown();
}
