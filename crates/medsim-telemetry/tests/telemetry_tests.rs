//! Integration tests for medsim-telemetry.

use medsim_telemetry::{EventBus, EventKind, SimulationEvent, TracingSink, VecSink};

#[test]
fn flush_delivers_in_emission_order() {
    let sink = VecSink::new();
    let mut bus = EventBus::new().with_sink(sink.clone());

    bus.emit_kind(0, EventKind::TimestepBegin { sim_time: 0.0 });
    bus.emit_kind(0, EventKind::SolverIteration { iteration: 1, residual: 0.5 });
    bus.emit_kind(0, EventKind::TimestepEnd { wall_time: 0.001 });
    assert!(sink.is_empty(), "sinks only see events after flush");

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0].kind, EventKind::TimestepBegin { .. }));
    assert!(matches!(events[1].kind, EventKind::SolverIteration { iteration: 1, .. }));
    assert!(matches!(events[2].kind, EventKind::TimestepEnd { .. }));
}

#[test]
fn disabled_bus_drops_events() {
    let sink = VecSink::new();
    let mut bus = EventBus::new().with_sink(sink.clone());
    bus.set_enabled(false);
    bus.emit_kind(0, EventKind::TimestepBegin { sim_time: 0.0 });
    bus.flush();
    assert!(sink.is_empty());
}

#[test]
fn every_sink_receives_every_event() {
    let a = VecSink::new();
    let b = VecSink::new();
    let mut bus = EventBus::new()
        .with_sink(a.clone())
        .with_sink(b.clone())
        .with_sink(TracingSink::new());
    assert_eq!(bus.sink_count(), 3);

    bus.emit_kind(2, EventKind::ConstraintsRemoved { count: 4 });
    bus.finalize();
    assert_eq!(a.len(), 1);
    assert_eq!(b.events(), a.events());
}

#[test]
fn events_serialize_with_type_tag() {
    let event = SimulationEvent::new(
        10,
        EventKind::Partitioned {
            colors: 5,
            partitions: 3,
            sequential: 7,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"partitioned\""));
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn convergence_event_fields() {
    let event = SimulationEvent::new(
        1,
        EventKind::Convergence {
            iterations: 15,
            final_residual: 1e-8,
            converged: true,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("converged"));
    assert!(json.contains("final_residual"));
}
