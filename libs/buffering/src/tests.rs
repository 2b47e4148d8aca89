use approx::assert_relative_eq;
use test_log::test;

use design::{Cell, Net, Pin, PinDirection};
use geometry::prelude::*;

use crate::dp::{self, WireModel};
use crate::solution::is_pareto;
use crate::tree::BufferTree;
use crate::*;

/// A zero-sized cell carrying one pin at `(x, y)`.
fn terminal(id: &str, x: i64, y: i64) -> Cell {
    Cell::new(arcstr::format!("{id}_cell"), Point::new(x, y), 0, 0).with_pin(Pin::new(
        id,
        id,
        Point::zero(),
        PinDirection::InOut,
    ))
}

fn two_pin(length: i64, max_capacitance: f64) -> BufferingParams {
    BufferingParams::new(
        Net::new("n", ["src", "snk"]),
        vec![terminal("src", 0, 0), terminal("snk", length, 0)],
        max_capacitance,
    )
}

/// The Elmore delay of an unbuffered wire split into `segments` equal pieces.
fn unbuffered_delay(segments: usize, r: f64, c: f64, load: f64) -> f64 {
    let mut delay = 0.;
    let mut cap = load;
    for _ in 0..segments {
        delay += r * (c + cap);
        cap += c;
    }
    delay
}

#[test]
fn long_wires_are_buffered() {
    let params = two_pin(1000, 100.);
    let result = van_ginneken_buffer_insertion(&params).unwrap();
    assert!(result.success);
    assert!(result.buffer_count > 0);
    assert_eq!(result.buffer_count, result.buffers.len());

    let unbuffered = unbuffered_delay(10, 10., 20., 1.);
    assert_relative_eq!(unbuffered, 11100.);
    assert!(result.total_delay < unbuffered);
    assert!(result.power_cost > 0.);
    assert!(result.runtime > std::time::Duration::ZERO);

    for buffer in &result.buffers {
        assert!(buffer.kind.starts_with("BUF_X"));
        assert_eq!(buffer.position.y, 0);
        assert!(buffer.position.x > 0 && buffer.position.x < 1000);
        assert_eq!(buffer.pins.len(), 2);
    }
}

#[test]
fn short_wires_are_not_buffered() {
    let result = van_ginneken_buffer_insertion(&two_pin(50, 100.)).unwrap();
    assert!(result.success);
    assert_eq!(result.buffer_count, 0);
    // 0.1 * 50 * (0.2 * 50 + 1.0)
    assert_relative_eq!(result.total_delay, 55.);
    assert_eq!(result.power_cost, 0.);
}

#[test]
fn max_capacitance_limits_buffering() {
    let result = van_ginneken_buffer_insertion(&two_pin(1000, 0.5)).unwrap();
    assert_eq!(result.buffer_count, 0);
    assert_relative_eq!(result.total_delay, unbuffered_delay(10, 10., 20., 1.));
}

#[test]
fn root_is_the_fastest_candidate() {
    let cells = vec![
        terminal("src", 0, 0),
        terminal("a", 600, 0),
        terminal("b", 0, 450),
        terminal("c", -300, -300),
    ];
    let net = Net::new("n", ["src", "a", "b", "c"]);
    let src = (arcstr::literal!("src"), Point::new(0, 0));
    let sinks = [
        (arcstr::literal!("a"), Point::new(600, 0)),
        (arcstr::literal!("b"), Point::new(0, 450)),
        (arcstr::literal!("c"), Point::new(-300, -300)),
    ];
    let tree = BufferTree::star(src, sinks, 100, 1.).unwrap();
    let wire = WireModel {
        resistance: 0.1,
        capacitance: 0.2,
    };
    let candidates = dp::solve(&tree, &default_library(), wire, 50.);
    assert!(is_pareto(&candidates));
    let best = dp::select(&candidates).unwrap();
    assert!(candidates.iter().all(|c| c.delay >= best.delay));

    let result = van_ginneken_buffer_insertion(&BufferingParams::new(net, cells, 50.)).unwrap();
    assert_relative_eq!(result.total_delay, best.delay);
    assert_relative_eq!(result.power_cost, best.power);
    assert_eq!(result.buffer_count, best.buffers.len());
}

#[test]
fn single_pin_net_needs_no_buffers() {
    let params = BufferingParams::new(
        Net::new("n", ["src", "ghost"]),
        vec![terminal("src", 0, 0)],
        10.,
    );
    let result = van_ginneken_buffer_insertion(&params).unwrap();
    assert!(result.success);
    assert_eq!(result.buffer_count, 0);
    assert_eq!(result.total_delay, 0.);
}

#[test]
fn unresolvable_net_fails() {
    let params = BufferingParams::new(
        Net::new("lost", ["ghost0", "ghost1"]),
        vec![terminal("src", 0, 0)],
        10.,
    );
    let failure = van_ginneken_buffer_insertion(&params).unwrap_err();
    assert_eq!(failure.error, Error::NoPinsForNet("lost".into()));
    assert!(!failure.result.success);
    assert_eq!(failure.result.buffer_count, 0);
    assert!(failure.result.buffers.is_empty());
    assert_eq!(failure.result.total_delay, 0.);
    assert!(failure.result.runtime > std::time::Duration::ZERO);
}

#[test]
fn invalid_parameters_are_rejected() {
    let cases = [
        two_pin(100, -1.),
        two_pin(100, 10.).with_target_slew(f64::NAN),
        two_pin(100, 10.).with_wire(-0.1, 0.2),
        two_pin(100, 10.).with_segment_length(0),
        two_pin(100, 10.).with_buffer_types(vec![BufferType::new("BAD", -1., 1., 1.)]),
    ];
    for params in cases {
        let failure = van_ginneken_buffer_insertion(&params).unwrap_err();
        assert!(matches!(failure.error, Error::InvalidParameter { .. }));
        assert!(!failure.result.success);
    }
}

#[test]
fn huge_nets_fail_without_panicking() {
    let failure = van_ginneken_buffer_insertion(&two_pin(i64::MAX, 10.).with_segment_length(1))
        .unwrap_err();
    assert!(matches!(
        failure.error,
        Error::InvalidParameter {
            name: "segment_length",
            ..
        }
    ));
    assert!(!failure.result.success);

    // A pin whose absolute position overflows is skipped like a dangling one.
    let far = Cell::new("far", Point::new(i64::MAX, 0), 1, 1)
        .with_pin(Pin::new("edge", "A", Point::new(1, 0), PinDirection::Input));
    let params = BufferingParams::new(
        Net::new("n", ["src", "edge"]),
        vec![terminal("src", 0, 0), far],
        10.,
    );
    let result = van_ginneken_buffer_insertion(&params).unwrap();
    assert!(result.success);
    assert_eq!(result.buffer_count, 0);
}

#[test]
fn custom_library_is_used() {
    let params = two_pin(1000, 100.)
        .with_buffer_types(vec![BufferType::new("REP", 1., 0.5, 0.1)]);
    let result = van_ginneken_buffer_insertion(&params).unwrap();
    assert!(result.buffer_count > 0);
    assert!(result.buffers.iter().all(|b| b.kind == "REP"));
    assert_relative_eq!(
        result.power_cost,
        0.1 * result.buffer_count as f64,
        max_relative = 1e-9
    );
}

#[test]
fn buffering_is_deterministic() {
    let a = van_ginneken_buffer_insertion(&two_pin(1500, 100.)).unwrap();
    let b = van_ginneken_buffer_insertion(&two_pin(1500, 100.)).unwrap();
    assert_eq!(a.buffers, b.buffers);
    assert_eq!(a.total_delay, b.total_delay);
}

#[test]
fn params_deserialize_with_defaults() {
    let params: BufferingParams = serde_json::from_str(
        r#"{"net": {"id": "n", "name": "n"}, "max_capacitance": 10.0}"#,
    )
    .unwrap();
    assert_eq!(
        params,
        BufferingParams::new(Net::new("n", Vec::<ArcStr>::new()), Vec::new(), 10.)
    );
    assert_eq!(params.library(), default_library());
}
