//! Headless line: generator -> belt -> exit against an in-memory controller.
//!
//! Run with: `cargo run --package beltline-runtime --example headless_line`
//!
//! The controller's motor bit gates the belt; we flip it mid-run through the
//! write side of the in-memory transport and watch the counters react.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use beltline_core::graph::SimulationGraph;
use beltline_core::tool::{BeltConfig, ExitConfig, GeneratorConfig, SpawnInterval};
use beltline_core::vars::VariableStore;
use beltline_runtime::{spawn_read_loop, spawn_tick_loop, spawn_write_loop, CancelToken};
use beltline_s7::codec;
use beltline_s7::mapping::{TagDirection, TagMap, TagRecord, TagWidth};
use beltline_s7::sync::PlcSync;
use beltline_s7::transport::MemoryPlc;

fn tag(db: u16, offset: u32, bit: u8, width: TagWidth, var: &str, dir: TagDirection) -> TagRecord {
    TagRecord {
        db,
        offset,
        bit,
        width,
        var: var.to_string(),
        direction: dir,
    }
}

fn main() {
    env_logger::init();

    // Topology: G -> B -> E, belt motor driven by the controller.
    let mut graph = SimulationGraph::new();
    let generator = graph.add_generator(GeneratorConfig {
        label: "G".to_string(),
        interval: SpawnInterval::Fixed(2),
        ..GeneratorConfig::default()
    });
    let belt = graph.add_belt(BeltConfig {
        label: "B".to_string(),
        slot_count: 4,
        motor_var: Some("B.motor".to_string()),
        ..BeltConfig::default()
    });
    let exit = graph.add_exit(ExitConfig {
        label: "E".to_string(),
        ..ExitConfig::default()
    });

    let g_out = graph.tool(generator).expect("generator").ports()[0];
    let (b_in, b_out) = {
        let b = graph.tool(belt).and_then(|t| t.as_belt()).expect("belt");
        (b.input, b.output)
    };
    let e_in = graph.tool(exit).expect("exit").ports()[0];
    graph.connect(g_out, b_in).expect("link G -> B");
    graph.connect(b_out, e_in).expect("link B -> E");

    // Controller memory: DB1 holds the motor bit, DB2 receives counters.
    let mut plc = MemoryPlc::new().with_block(1, 2).with_block(2, 8);
    codec::set_bool(plc.block_mut(1).expect("DB1"), 0, 0, true).expect("motor bit");

    let (map, issues) = TagMap::load(vec![
        tag(1, 0, 0, TagWidth::Bool, "B.motor", TagDirection::Read),
        tag(2, 0, 0, TagWidth::DWord, "G.produced", TagDirection::Write),
        tag(2, 4, 0, TagWidth::DWord, "E.consumed", TagDirection::Write),
    ]);
    assert!(issues.is_empty(), "tag map issues: {issues:?}");

    let vars = Arc::new(VariableStore::new());
    let graph = Arc::new(Mutex::new(graph));
    let sync = Arc::new(PlcSync::new(plc, map, Arc::clone(&vars)));
    let cancel = CancelToken::new();

    let handles = vec![
        spawn_tick_loop(
            Arc::clone(&graph),
            Arc::clone(&vars),
            Duration::from_millis(5),
            cancel.clone(),
        ),
        spawn_read_loop(Arc::clone(&sync), Duration::from_millis(5), cancel.clone()),
        spawn_write_loop(Arc::clone(&sync), Duration::from_millis(5), cancel.clone()),
    ];

    thread::sleep(Duration::from_millis(100));

    // Stop the belt from the controller side.
    {
        let mut transport = sync.transport().lock().expect("transport");
        codec::set_bool(transport.block_mut(1).expect("DB1"), 0, 0, false).expect("motor bit");
    }
    println!("motor off");
    thread::sleep(Duration::from_millis(100));

    let stalled = {
        let g = graph.lock().expect("graph");
        (g.tick_count(), g.boxes_produced(), g.boxes_consumed())
    };
    println!(
        "after motor off: tick={}, produced={}, consumed={}",
        stalled.0, stalled.1, stalled.2
    );

    // Back on, let the backlog drain.
    {
        let mut transport = sync.transport().lock().expect("transport");
        codec::set_bool(transport.block_mut(1).expect("DB1"), 0, 0, true).expect("motor bit");
    }
    println!("motor on");
    thread::sleep(Duration::from_millis(100));

    cancel.cancel();
    for handle in handles {
        handle.join().expect("runtime thread panicked");
    }

    let g = graph.lock().expect("graph");
    println!(
        "final: tick={}, produced={}, consumed={}, resident={}",
        g.tick_count(),
        g.boxes_produced(),
        g.boxes_consumed(),
        g.resident_boxes()
    );

    let transport = sync.transport().lock().expect("transport");
    let db2 = transport.block(2).expect("DB2");
    println!(
        "controller sees: produced={}, consumed={}",
        codec::get_dint(db2, 0).expect("produced"),
        codec::get_dint(db2, 4).expect("consumed")
    );

    assert!(g.boxes_consumed() > stalled.2, "backlog never drained");
}
