use approx::assert_relative_eq;
use test_log::test;

use crate::*;

/// Four primitives; `t1` and `t2` compute the same function.
const REDUNDANT: &str = "
module redundant(a, b, c, y, z);
  input a, b, c;
  output y, z;
  wire t1, t2;
  and g1(t1, a, b);
  and g2(t2, a, b);
  or g3(y, t1, t2);
  not g4(z, c);
endmodule
";

const ALL_PRIMITIVES: &str = "
module prims(a, b, c, o1, o2, o3, o4, o5, o6);
  input a, b, c;
  output o1, o2, o3, o4, o5, o6;
  and g1(o1, a, b);
  or g2(o2, a, b);
  not g3(o3, a);
  xor g4(o4, a, b);
  NAND g5(o5, a, b, c);
  nor g6(o6, a, b);
endmodule
";

/// A chain of four dependent AND gates.
const CHAIN: &str = "
and g1(x1, a, b);
and g2(x2, x1, c);
and g3(x3, x2, d);
and g4(y, x3, e);
";

fn logic_opt(netlist: &str, goal: OptimizationGoal) -> SynthesisResult {
    run_synthesis(&SynthesisParams::new("logic_opt", netlist).with_goal(goal)).unwrap()
}

#[test]
fn empty_netlist_has_no_gates() {
    for algorithm in ["logic_opt", "techmap"] {
        let result = run_synthesis(&SynthesisParams::new(algorithm, "")).unwrap();
        assert!(result.success);
        assert_eq!(result.gate_count, 0);
        assert_eq!(result.area, 0.);
        assert_eq!(result.optimized_netlist, "");
        assert!(result.runtime > std::time::Duration::ZERO);
    }
}

#[test]
fn area_goal_removes_duplicate_logic() {
    let result = logic_opt(REDUNDANT, OptimizationGoal::Area);
    assert!(result.success);
    assert!(result.gate_count < 4);
    assert_eq!(result.gate_count, 1);
    assert_relative_eq!(result.area, result.gate_count as f64 * 100.);
    assert!(result.optimized_netlist.starts_with("module redundant(a, b, c, y, z);"));
    assert!(result.optimized_netlist.contains("assign z = ~c;"));
    assert!(result.optimized_netlist.trim_end().ends_with("endmodule"));
}

#[test]
fn power_goal_keeps_structure() {
    let area = logic_opt(REDUNDANT, OptimizationGoal::Area);
    let power = logic_opt(REDUNDANT, OptimizationGoal::Power);
    assert_eq!(power.gate_count, 3);
    assert_relative_eq!(power.power, power.gate_count as f64 * 0.5);
    assert!(power.gate_count >= area.gate_count);
}

#[test]
fn timing_goal_meets_clock() {
    for clock in [10., 1., 0.25] {
        let result = run_synthesis(
            &SynthesisParams::new("logic_opt", CHAIN)
                .with_goal(OptimizationGoal::Timing)
                .with_clock_period(clock),
        )
        .unwrap();
        assert!(result.critical_path_delay < clock);
        assert_relative_eq!(result.critical_path_delay, 0.8 * clock);
    }
}

#[test]
fn timing_goal_duplicates_deep_gates() {
    let area = logic_opt(CHAIN, OptimizationGoal::Area);
    assert_eq!(area.gate_count, 4);
    assert_relative_eq!(area.critical_path_delay, 0.4);

    // A 0.2 ns target allows two levels; the gates at levels 3 and 4 are duplicated.
    let timing = run_synthesis(
        &SynthesisParams::new("logic_opt", CHAIN)
            .with_goal(OptimizationGoal::Timing)
            .with_clock_period(0.25),
    )
    .unwrap();
    assert_eq!(timing.gate_count, 6);
    assert!(timing.gate_count > area.gate_count);
    assert_relative_eq!(timing.area, 600.);
}

#[test]
fn constants_are_kept_verbatim() {
    let result = logic_opt(
        "and g1(x, a, 1'b1); or g2(y, x, b, 1'b0); and g3(z, c, 1'b0);",
        OptimizationGoal::Area,
    );
    let text = &result.optimized_netlist;
    assert!(text.contains("// constant 1'b1 feeds g1 (and)"));
    assert!(text.contains("// constant 1'b0 feeds g2 (or)"));
    assert!(text.contains("assign z = 1'b0;"));
    assert!(text.starts_with("// constant"));
    assert!(text.contains("module top("));
}

#[test]
fn optimizer_is_idempotent() {
    for goal in [
        OptimizationGoal::Area,
        OptimizationGoal::Power,
        OptimizationGoal::Timing,
    ] {
        let a = logic_opt(ALL_PRIMITIVES, goal);
        let b = logic_opt(ALL_PRIMITIVES, goal);
        assert_eq!(a.optimized_netlist, b.optimized_netlist);
        assert_eq!(a.gate_count, b.gate_count);
    }
}

#[test]
fn techmap_names_library_cells() {
    let result = run_synthesis(&SynthesisParams::new("techmap", ALL_PRIMITIVES)).unwrap();
    let text = &result.optimized_netlist;
    for cell in ["AND2", "OR2", "INV", "XOR2", "NAND3", "NOR2"] {
        assert!(text.contains(&format!("generic_{cell}")), "missing {cell}");
    }
    assert!(text.contains("generic_NAND3 g5 (.Y(o5), .A(a), .B(b), .C(c));"));
    assert_eq!(result.gate_count, 6);
    assert_relative_eq!(result.area, 6. * 120.);
    assert_relative_eq!(result.power, 6. * 0.6);
    assert_relative_eq!(result.critical_path_delay, 0.1);

    let mapped = run_synthesis(
        &SynthesisParams::new("tech_map", ALL_PRIMITIVES).with_target_library("sky130"),
    )
    .unwrap();
    assert!(mapped.optimized_netlist.contains("sky130_XOR2 g4"));
    assert!(!mapped.optimized_netlist.contains("generic_"));
}

#[test]
fn techmap_keeps_constants_and_names_anonymous_instances() {
    let result = run_synthesis(&SynthesisParams::new(
        "technology_mapping",
        "and (y, a, 1'b1);\nnot (z, y);",
    ))
    .unwrap();
    let text = &result.optimized_netlist;
    assert!(text.contains("generic_AND2 U0 (.Y(y), .A(a), .B(1'b1));"));
    assert!(text.contains("generic_INV U1 (.Y(z), .A(y));"));
    assert_relative_eq!(result.critical_path_delay, 0.2);
}

#[test]
fn unsupported_algorithms_are_rejected() {
    let err = run_synthesis(&SynthesisParams::new("retime", REDUNDANT)).unwrap_err();
    assert_eq!(err, Error::UnsupportedAlgorithm("retime".into()));
    assert!(err
        .to_string()
        .contains("Unsupported synthesis algorithm: retime"));
}

#[test]
fn parse_errors_are_reported() {
    let err = run_synthesis(&SynthesisParams::new("logic_opt", "and g(y, a")).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn invalid_clock_period_is_rejected() {
    for clock in [0., -1., f64::INFINITY] {
        let params = SynthesisParams::new("logic_opt", REDUNDANT).with_clock_period(clock);
        assert!(matches!(
            run_synthesis(&params),
            Err(Error::InvalidParameter {
                name: "clock_period",
                ..
            })
        ));
    }
}

#[test]
fn goals_parse_from_strings() {
    assert_eq!("Timing".parse::<OptimizationGoal>().unwrap(), OptimizationGoal::Timing);
    assert!("speed".parse::<OptimizationGoal>().is_err());
}

#[test]
fn params_deserialize_with_defaults() {
    let params: SynthesisParams =
        serde_json::from_str(r#"{"algorithm": "techmap", "netlist": "not n(y, a);"}"#).unwrap();
    assert_eq!(params, SynthesisParams::new("techmap", "not n(y, a);"));

    let params: SynthesisParams = serde_json::from_str(
        r#"{"algorithm": "logic_opt", "netlist": "", "optimization_level": "power"}"#,
    )
    .unwrap();
    assert_eq!(params.optimization_level, OptimizationGoal::Power);
}
