//! End-to-end pipeline tests: configuration through ranked report text.

use eseries_fit::{write_report, Search, E12};

const FORMULA: &str = "20*log10(1+r1/r2)";

fn run_divider(grid: &[f64]) -> eseries_fit::ResultSet {
    let objective = format!("abs(({})-(24))", FORMULA);
    let mut search = Search::new(&objective, FORMULA, &[]).unwrap();
    for name in search.variables() {
        search.set_grid(&name, grid.to_vec()).unwrap();
    }
    search.run().unwrap()
}

fn render(results: &eseries_fit::ResultSet) -> String {
    let mut out = Vec::new();
    write_report(&mut out, FORMULA, results).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn divider_scenario_ranks_best_first() {
    let results = run_divider(&[100.0, 1000.0]);
    assert_eq!(results.len(), 4);
    assert_eq!(results.variables(), ["r1", "r2"]);

    // 20*log10(1 + 1000/100) is the only assignment near 24 dB.
    let best = results.best().unwrap();
    assert_eq!(best.values(), &[1000.0, 100.0][..]);
    let expected = 20.0 * (1.0_f64 + 1000.0 / 100.0).log10();
    assert!((best.result - expected).abs() < 1e-12);
    assert!((best.error - (expected - 24.0).abs()).abs() < 1e-12);

    let errors: Vec<f64> = results.iter().map(|c| c.error).collect();
    assert!(errors.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn report_has_header_and_rounded_columns() {
    let results = run_divider(&[100.0, 1000.0]);
    let text = render(&results);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], format!("error\t{}\tr1\tr2", FORMULA));
    let best_cols: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(best_cols.len(), 4);
    assert_eq!(best_cols[2], "1000");
    assert_eq!(best_cols[3], "100");
}

#[test]
fn identical_runs_produce_identical_output() {
    let grid = E12.grid(&[1e2, 1e3]);
    let first = render(&run_divider(&grid));
    let second = render(&run_divider(&grid));
    assert_eq!(first, second);
    // 24 values per variable, every combination reported.
    assert_eq!(first.lines().count(), 1 + 24 * 24);
}
