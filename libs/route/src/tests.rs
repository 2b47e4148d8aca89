use test_log::test;

use design::{Cell, Net, Pin, PinDirection};
use geometry::prelude::*;

use crate::*;

const ALGORITHMS: [&str; 3] = ["maze", "astar", "global"];

/// A zero-sized cell carrying one pin at `(x, y)`.
fn terminal(id: &str, x: i64, y: i64) -> Cell {
    Cell::new(arcstr::format!("{id}_cell"), Point::new(x, y), 0, 0).with_pin(Pin::new(
        id,
        id,
        Point::zero(),
        PinDirection::InOut,
    ))
}

fn fixture(algorithm: &str) -> RoutingParams {
    let cells = vec![
        Cell::new("u0", Point::new(10, 10), 20, 20)
            .with_kind("NAND2")
            .with_pin(Pin::new("u0.a", "A", Point::new(0, 5), PinDirection::Input))
            .with_pin(Pin::new("u0.y", "Y", Point::new(20, 10), PinDirection::Output)),
        Cell::new("u1", Point::new(80, 60), 20, 20)
            .with_kind("INV")
            .with_pin(Pin::new("u1.a", "A", Point::new(0, 10), PinDirection::Input))
            .with_pin(Pin::new("u1.y", "Y", Point::new(20, 10), PinDirection::Output)),
        Cell::new("u2", Point::new(150, 20), 20, 20)
            .with_kind("INV")
            .with_pin(Pin::new("u2.a", "A", Point::new(0, 10), PinDirection::Input)),
    ];
    let nets = vec![
        Net::new("n0", ["u0.y", "u1.a"]),
        Net::new("n1", ["u1.y", "u2.a", "u0.a"]),
    ];
    RoutingParams::new(algorithm, 200, 100, 2)
        .with_grid_size(10)
        .with_cells(cells)
        .with_nets(nets)
}

fn assert_in_bounds(params: &RoutingParams, result: &RoutingResult) {
    let chip = Rect::from_extent(params.chip_width, params.chip_height);
    for wire in &result.wires {
        assert!(wire.layer < params.layers, "wire {} on bad layer", wire.id);
        assert!(wire.points.len() >= 2);
        for p in &wire.points {
            assert!(chip.contains(*p), "wire {} leaves the chip at {p}", wire.id);
        }
    }
}

#[test]
fn detailed_routers_route_fixture() {
    for algorithm in ["maze", "astar"] {
        let params = fixture(algorithm);
        let result = run_routing(&params).unwrap();
        assert!(result.success, "{algorithm} left {:?}", result.unrouted_nets);
        assert!(!result.wires.is_empty());
        assert!(result.total_wirelength > 0);
        assert!(result.runtime > std::time::Duration::ZERO);
        assert_eq!(
            result.total_wirelength,
            result.wires.iter().map(|w| w.length()).sum::<i64>()
        );
        assert_in_bounds(&params, &result);
    }
}

#[test]
fn wires_stay_on_chip() {
    for algorithm in ALGORITHMS {
        let params = fixture(algorithm);
        let result = run_routing(&params).unwrap();
        assert_in_bounds(&params, &result);
    }
}

#[test]
fn trivial_nets_yield_no_wires() {
    for algorithm in ALGORITHMS {
        let params = RoutingParams::new(algorithm, 100, 100, 2)
            .with_cells(vec![terminal("a", 0, 0)])
            .with_nets(vec![Net::new("empty", Vec::<ArcStr>::new()), Net::new("one", ["a"])]);
        let result = run_routing(&params).unwrap();
        assert!(result.success);
        assert!(result.wires.is_empty());
        assert_eq!(result.total_wirelength, 0);
    }
}

#[test]
fn global_routes_are_l_shaped() {
    let params = fixture("global");
    let result = run_routing(&params).unwrap();
    assert!(result.success);
    assert_eq!(result.via_count, 0);
    assert_eq!(result.wires.len(), 2);
    for wire in &result.wires {
        assert_eq!(wire.points.len(), 3);
        assert_eq!(wire.width, 2);
        assert_eq!(wire.layer, 0);
        assert_eq!(wire.points[0].y, wire.points[1].y);
        assert_eq!(wire.points[1].x, wire.points[2].x);
    }
    // u0.y sits at (30, 20): bin (3, 2), centre (35, 25).
    assert_eq!(result.wires[0].points[0], Point::new(35, 25));
}

#[test]
fn global_bin_centres_are_clamped() {
    let params = RoutingParams::new("global", 95, 95, 1)
        .with_cells(vec![terminal("a", 0, 0), terminal("b", 95, 95)])
        .with_nets(vec![Net::new("n", ["a", "b"])]);
    let result = run_routing(&params).unwrap();
    assert_eq!(
        result.wires[0].points,
        vec![Point::new(5, 5), Point::new(95, 5), Point::new(95, 95)]
    );
}

#[test]
fn unsupported_algorithms_are_rejected() {
    let err = run_routing(&fixture("steiner")).unwrap_err();
    assert_eq!(err, Error::UnsupportedAlgorithm("steiner".into()));
    assert!(err
        .to_string()
        .contains("Unsupported routing algorithm: steiner"));
}

#[test]
fn algorithm_tags_ignore_case() {
    for tag in ["MAZE", "Lee", "AStar", "A-STAR", "Global"] {
        assert!(tag.parse::<RoutingAlgorithm>().is_ok(), "{tag}");
    }
}

#[test]
fn invalid_parameters_are_rejected() {
    let cases = [
        fixture("maze").with_grid_size(0),
        fixture("maze").with_via_weight(-1.),
        fixture("astar").with_bend_weight(f64::NAN),
        RoutingParams::new("maze", 100, 100, 0),
        RoutingParams::new("global", -5, 100, 1),
    ];
    for params in cases {
        assert!(matches!(
            run_routing(&params),
            Err(Error::InvalidParameter { .. })
        ));
    }
}

#[test]
fn oversized_grids_are_rejected() {
    for algorithm in ALGORITHMS {
        let params =
            RoutingParams::new(algorithm, i64::MAX / 2, i64::MAX / 2, 1).with_grid_size(1);
        let err = run_routing(&params).unwrap_err();
        assert!(
            matches!(err, Error::InvalidParameter { name: "grid_size", .. }),
            "{algorithm}: {err}"
        );
    }
    let params = RoutingParams::new("maze", i64::MAX, 0, usize::MAX).with_grid_size(i64::MAX);
    assert!(run_routing(&params).is_err());
}

#[test]
fn overflowing_pin_positions_leave_net_unrouted() {
    let far = Cell::new("far", Point::new(i64::MAX, 0), 1, 1)
        .with_pin(Pin::new("edge", "Y", Point::new(1, 0), PinDirection::Output));
    for algorithm in ALGORITHMS {
        let params = RoutingParams::new(algorithm, 100, 100, 1)
            .with_cells(vec![terminal("a", 10, 10), far.clone()])
            .with_nets(vec![Net::new("n", ["a", "edge"])]);
        let result = run_routing(&params).unwrap();
        assert!(!result.success, "{algorithm}");
        assert_eq!(result.unrouted_nets, vec![arcstr::literal!("n")]);
    }
}

#[test]
fn routed_nets_block_later_nets() {
    let cells = vec![
        terminal("a0", 0, 0),
        terminal("a1", 40, 0),
        terminal("b0", 10, 0),
        terminal("b1", 30, 0),
    ];
    let a = Net::new("a", ["a0", "a1"]);
    let b = Net::new("b", ["b0", "b1"]);
    for algorithm in ["maze", "astar"] {
        let params = RoutingParams::new(algorithm, 40, 0, 1)
            .with_cells(cells.clone())
            .with_nets(vec![a.clone(), b.clone()]);
        let result = run_routing(&params).unwrap();
        assert!(!result.success);
        assert_eq!(result.unrouted_nets, vec![arcstr::literal!("b")]);
        assert_eq!(result.total_wirelength, 40);

        let reversed = params.with_nets(vec![b.clone(), a.clone()]);
        let result = run_routing(&reversed).unwrap();
        assert_eq!(result.unrouted_nets, vec![arcstr::literal!("a")]);
        assert_eq!(result.total_wirelength, 20);
    }
}

#[test]
fn failed_nets_release_their_points() {
    // `c` routes its first branch before the second fails on `e`'s pin,
    // so `d` can only route if that branch was rolled back.
    let cells = vec![
        terminal("e0", 50, 0),
        terminal("e1", 60, 0),
        terminal("c0", 30, 0),
        terminal("c1", 10, 0),
        terminal("c2", 60, 0),
        terminal("d0", 0, 0),
        terminal("d1", 40, 0),
    ];
    let nets = vec![
        Net::new("e", ["e0", "e1"]),
        Net::new("c", ["c0", "c1", "c2"]),
        Net::new("d", ["d0", "d1"]),
    ];
    let params = RoutingParams::new("maze", 60, 0, 1)
        .with_cells(cells)
        .with_nets(nets);
    let result = run_routing(&params).unwrap();
    assert_eq!(result.unrouted_nets, vec![arcstr::literal!("c")]);
    assert!(result.wires.iter().all(|w| w.net_id != "c"));
    assert!(result.wires.iter().any(|w| w.net_id == "d"));
}

#[test]
fn vias_cross_blockages() {
    let cells = vec![
        terminal("w0", 20, 0),
        terminal("w1", 20, 20),
        terminal("s", 0, 10),
        terminal("t", 40, 10),
    ];
    let nets = vec![Net::new("wall", ["w0", "w1"]), Net::new("x", ["s", "t"])];
    for algorithm in ["maze", "astar"] {
        let two_layers = RoutingParams::new(algorithm, 40, 20, 2)
            .with_cells(cells.clone())
            .with_nets(nets.clone());
        let result = run_routing(&two_layers).unwrap();
        assert!(result.success);
        assert_eq!(result.via_count, 2);
        assert!(result.wires.iter().any(|w| w.layer == 1));
        assert_in_bounds(&two_layers, &result);

        let one_layer = RoutingParams {
            layers: 1,
            ..two_layers
        };
        let result = run_routing(&one_layer).unwrap();
        assert_eq!(result.unrouted_nets, vec![arcstr::literal!("x")]);
    }
}

#[test]
fn collinear_points_are_collapsed() {
    let params = RoutingParams::new("astar", 100, 100, 1)
        .with_cells(vec![terminal("a", 0, 0), terminal("b", 80, 0)])
        .with_nets(vec![Net::new("n", ["a", "b"])]);
    let result = run_routing(&params).unwrap();
    assert_eq!(result.wires.len(), 1);
    assert_eq!(
        result.wires[0].points,
        vec![Point::new(0, 0), Point::new(80, 0)]
    );
}

#[test]
fn unresolvable_pins_leave_net_unrouted() {
    for algorithm in ALGORITHMS {
        let params = RoutingParams::new(algorithm, 100, 100, 2)
            .with_cells(vec![terminal("a", 10, 10), terminal("far", 150, 10)])
            .with_nets(vec![
                Net::new("dangling", ["a", "ghost"]),
                Net::new("offchip", ["a", "far"]),
            ]);
        let result = run_routing(&params).unwrap();
        assert!(!result.success);
        assert_eq!(result.unrouted_nets.len(), 2, "{algorithm}");
        assert!(result.wires.is_empty());
    }
}

#[test]
fn boundary_cell_absorbs_remainder() {
    let params = RoutingParams::new("maze", 95, 95, 1)
        .with_cells(vec![terminal("a", 0, 0), terminal("b", 94, 0)])
        .with_nets(vec![Net::new("n", ["a", "b"])]);
    let result = run_routing(&params).unwrap();
    assert!(result.success);
    assert_eq!(result.wires[0].points.last(), Some(&Point::new(90, 0)));
}

#[test]
fn coincident_pins_need_no_wire() {
    let params = RoutingParams::new("maze", 100, 100, 1)
        .with_cells(vec![terminal("a", 11, 11), terminal("b", 9, 9)])
        .with_nets(vec![Net::new("n", ["a", "b"])]);
    let result = run_routing(&params).unwrap();
    assert!(result.success);
    assert!(result.wires.is_empty());
}

#[test]
fn routing_is_deterministic() {
    for algorithm in ALGORITHMS {
        let a = run_routing(&fixture(algorithm)).unwrap();
        let b = run_routing(&fixture(algorithm)).unwrap();
        assert_eq!(a.wires, b.wires);
        assert_eq!(a.via_count, b.via_count);
        assert_eq!(a.unrouted_nets, b.unrouted_nets);
    }
}

#[test]
fn params_deserialize_with_defaults() {
    let params: RoutingParams = serde_json::from_str(
        r#"{"algorithm": "maze", "chip_width": 50, "chip_height": 50, "layers": 1}"#,
    )
    .unwrap();
    assert_eq!(params, RoutingParams::new("maze", 50, 50, 1));
    assert!(run_routing(&params).unwrap().success);
}
