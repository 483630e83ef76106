use crate::constants::*;
use crate::insolation::*;

#[test]
fn test_insolation_matches_formula() {
    let cases = [(-1.0, 0.125), (0.0, 1.0), (-2.5, 0.02), (0.3, 3.1)];

    for (lum, a) in cases {
        let expected = 10f64.powf(lum) / (a * a);
        let got = approx_insolation(lum, a);
        assert!((got - expected).abs() <= expected * 1e-12,
            "insolation mismatch for L={} a={}: {} vs {}", lum, a, got, expected);
    }
}

#[test]
fn test_gj667c_like_insolation() {
    // 10^-1 / 0.125^2 = 0.1 * 64
    let s = approx_insolation(-1.0, 0.125);
    assert!((s - 6.4).abs() < 1e-9, "got {}", s);
}

#[test]
fn test_insolation_nan_propagation() {
    assert!(approx_insolation(f64::NAN, 1.0).is_nan());
    assert!(approx_insolation(0.0, f64::NAN).is_nan());
    assert!(approx_insolation(f64::NAN, f64::NAN).is_nan());
}

#[test]
fn test_earth_equilibrium_temperature() {
    let t = equilibrium_temperature(1.0);
    assert!((t - EARTH_EQ_TEMP_K).abs() < 1e-12);

    // 16x flux doubles the temperature
    let t16 = equilibrium_temperature(16.0);
    assert!((t16 - 2.0 * EARTH_EQ_TEMP_K).abs() < 1e-9);
}

#[test]
fn test_equilibrium_temperature_domain() {
    assert!(equilibrium_temperature(f64::NAN).is_nan());
    assert!(equilibrium_temperature(-1.0).is_nan());
    assert_eq!(equilibrium_temperature(0.0), 0.0);
}

#[test]
fn test_reference_orbits() {
    assert!((insolation_at_orbit(1.0) - 1.0).abs() < 1e-15);
    // Venus receives roughly twice Earth's flux
    let venus = insolation_at_orbit(0.723);
    assert!(venus > 1.9 && venus < 1.92, "Venus insolation {}", venus);
}
