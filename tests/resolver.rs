//! 단일 시료 물리지수 유도 회귀 테스트.
use std::io;
use std::sync::{Arc, Mutex};

use soil_index_toolbox::soil::{
    resolve, DensityClass, Magnitude, PhaseError, SampleInput, PARTIAL_CALCULATION_ADVISORY,
};

fn assert_close(label: &str, actual: Option<f64>, expected: f64, tol: f64) {
    let actual = actual.unwrap_or_else(|| panic!("{label} missing"));
    assert!(
        (actual - expected).abs() <= tol,
        "{label} expected {expected:.6} got {actual:.6} (tol {tol})"
    );
}

fn finite(value: Option<Magnitude>) -> Option<f64> {
    value.and_then(Magnitude::finite)
}

fn lab_sample() -> SampleInput {
    SampleInput {
        total_mass: Some(150.5),
        solids_mass: Some(130.2),
        total_volume: Some(100.0),
        ..SampleInput::default()
    }
}

#[test]
fn masses_volume_and_gs_resolve_everything() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.70),
        water_unit_weight: Some(10.0),
        ..lab_sample()
    })
    .expect("scenario A");

    assert_close("w", finite(out.water_content), 15.59, 1e-9);
    assert_close("γnat", out.natural_unit_weight, 15.05, 1e-9);
    assert_close("γd", out.dry_unit_weight, 13.02, 1e-9);
    assert_close("γs", out.solids_unit_weight, 27.0, 1e-9);
    assert_close("e", finite(out.void_ratio), 1.0737, 1e-9);
    assert_close("n", out.porosity, 51.78, 1e-9);
    assert_close("S", out.saturation, 39.21, 1e-9);
    assert_close("γsat", out.saturated_unit_weight, 18.198, 1e-9);
    assert_close("γsub", out.submerged_unit_weight, 8.198, 1e-9);
    assert!(out.advisory.is_none());

    // Se = wGs (반올림 오차 범위 내)
    let s = out.saturation.unwrap() / 100.0;
    let w = finite(out.water_content).unwrap() / 100.0;
    let e = finite(out.void_ratio).unwrap();
    assert!((s * e - w * 2.70).abs() < 1e-3);
}

#[test]
fn masses_volume_and_gs_reconstruct_phase_volumes() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.70),
        ..lab_sample()
    })
    .expect("scenario A");
    assert_close("V", out.total_volume, 100.0, 1e-9);
    assert_close("Vs", out.solids_volume, 48.222, 1e-9);
    assert_close("Vw", out.water_volume, 20.3, 1e-9);
    assert_close("Va", out.air_volume, 31.478, 1e-9);
    assert_close("Mt", out.total_mass, 150.5, 1e-9);
    assert_close("Ms", out.solids_mass, 130.2, 1e-9);
    assert_close("Mw", out.water_mass, 20.3, 1e-9);
}

#[test]
fn masses_and_volume_only_give_partial_result_with_advisory() {
    let out = resolve(&lab_sample()).expect("scenario B");
    assert_close("w", finite(out.water_content), 15.59, 1e-9);
    assert_close("γnat", out.natural_unit_weight, 15.05, 1e-9);
    assert_close("γd", out.dry_unit_weight, 13.02, 1e-9);
    assert!(out.void_ratio.is_none());
    assert!(out.porosity.is_none());
    assert!(out.saturation.is_none());
    assert!(out.specific_gravity.is_none());
    assert!(out.saturated_unit_weight.is_none());
    assert_eq!(out.advisory.as_deref(), Some(PARTIAL_CALCULATION_ADVISORY));
}

#[test]
fn relative_density_is_classified() {
    let out = resolve(&SampleInput {
        void_ratio: Some(0.65),
        max_void_ratio: Some(0.85),
        min_void_ratio: Some(0.35),
        ..SampleInput::default()
    })
    .expect("scenario C");
    assert_close("Dr", out.relative_density, 40.0, 1e-9);
    assert_eq!(out.density_class, Some(DensityClass::Medium));
    assert_eq!(out.density_class.unwrap().label(), "Média");
    assert_close("n", out.porosity, 39.39, 1e-9);
}

#[test]
fn void_ratio_outside_limits_is_flagged() {
    let out = resolve(&SampleInput {
        void_ratio: Some(0.95),
        max_void_ratio: Some(0.85),
        min_void_ratio: Some(0.35),
        ..SampleInput::default()
    })
    .expect("out of range is not a failure");
    assert_eq!(out.relative_density, None);
    assert_eq!(out.density_class, Some(DensityClass::OutOfRange));
}

#[test]
fn saturation_round_trips_through_water_content() {
    let forward = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        void_ratio: Some(0.9),
        saturation: Some(60.0),
        ..SampleInput::default()
    })
    .expect("forward");
    let w = finite(forward.water_content).expect("w derived");
    assert_close("w", Some(w), 20.0, 1e-9);

    let back = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        void_ratio: Some(0.9),
        water_content: Some(w),
        ..SampleInput::default()
    })
    .expect("back");
    assert_close("S", back.saturation, 60.0, 1e-9);
}

#[test]
fn unit_weights_match_between_equivalent_inputs() {
    let from_indices = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        void_ratio: Some(0.9),
        saturation: Some(60.0),
        water_unit_weight: Some(10.0),
        ..SampleInput::default()
    })
    .expect("indices");
    let gamma_nat = 10.0 * (2.7 + 0.6 * 0.9) / 1.9;
    assert_close("γnat", from_indices.natural_unit_weight, gamma_nat, 1e-3);

    let from_weights = resolve(&SampleInput {
        natural_unit_weight: Some(gamma_nat),
        water_content: Some(20.0),
        specific_gravity: Some(2.7),
        water_unit_weight: Some(10.0),
        ..SampleInput::default()
    })
    .expect("weights");

    for (label, a, b) in [
        ("γd", from_indices.dry_unit_weight, from_weights.dry_unit_weight),
        ("γsat", from_indices.saturated_unit_weight, from_weights.saturated_unit_weight),
        ("γsub", from_indices.submerged_unit_weight, from_weights.submerged_unit_weight),
    ] {
        assert_close(label, a, b.expect("derived"), 1e-3);
    }
    assert_close("e", finite(from_weights.void_ratio), 0.9, 1e-4);
}

#[test]
fn saturation_grows_with_water_content_until_clamped() {
    let mut last = -1.0;
    for w in [5.0, 10.0, 20.0, 30.0, 40.0, 50.0] {
        let out = resolve(&SampleInput {
            specific_gravity: Some(2.7),
            void_ratio: Some(0.9),
            water_content: Some(w),
            ..SampleInput::default()
        })
        .expect("resolve");
        let s = out.saturation.expect("S");
        assert!(s >= last, "S decreased: {last} -> {s} at w={w}");
        assert!(s <= 100.0);
        last = s;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn saturation_just_above_one_clamps_to_one() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        void_ratio: Some(0.81),
        water_content: Some(30.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_eq!(out.saturation, Some(100.0));
}

#[test]
fn void_ratio_within_tolerance_below_zero_clamps() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        dry_unit_weight: Some(27.0 + 1e-10),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_eq!(out.void_ratio, Some(Magnitude::Finite(0.0)));
    assert_eq!(out.porosity, Some(0.0));
}

#[test]
fn dry_unit_weight_above_solids_fails() {
    let err = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        dry_unit_weight: Some(30.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::Inconsistent(_)), "{err}");
}

#[test]
fn zero_dry_unit_weight_gives_unbounded_void_ratio() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        dry_unit_weight: Some(0.0),
        max_void_ratio: Some(0.85),
        min_void_ratio: Some(0.35),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_eq!(out.void_ratio, Some(Magnitude::Unbounded));
    assert!(out.porosity.is_none());
    assert!(out.saturated_unit_weight.is_none());
    assert_eq!(out.density_class, Some(DensityClass::OutOfRange));
}

#[test]
fn zero_dry_mass_is_invalid_divisor() {
    let err = resolve(&SampleInput {
        total_mass: Some(10.0),
        solids_mass: Some(0.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::InvalidDivisor(_)), "{err}");
}

#[test]
fn zero_volume_is_invalid_divisor() {
    let err = resolve(&SampleInput {
        total_mass: Some(10.0),
        total_volume: Some(0.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::InvalidDivisor(_)), "{err}");
}

#[test]
fn wet_mass_below_dry_mass_is_inconsistent() {
    let err = resolve(&SampleInput {
        total_mass: Some(100.0),
        solids_mass: Some(120.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::Inconsistent(_)), "{err}");
}

#[test]
fn mismatched_gs_and_solids_unit_weight_fail() {
    let err = resolve(&SampleInput {
        specific_gravity: Some(2.70),
        solids_unit_weight: Some(28.0),
        water_unit_weight: Some(10.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::Inconsistent(_)), "{err}");

    let ok = resolve(&SampleInput {
        specific_gravity: Some(2.70),
        solids_unit_weight: Some(27.005),
        water_unit_weight: Some(10.0),
        ..SampleInput::default()
    });
    assert!(ok.is_ok());
}

#[test]
fn water_without_voids_is_contradiction() {
    let err = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        water_content: Some(10.0),
        saturation: Some(0.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::Inconsistent(_)), "{err}");
}

#[test]
fn full_porosity_is_invalid_divisor() {
    let err = resolve(&SampleInput {
        porosity: Some(100.0),
        ..SampleInput::default()
    })
    .unwrap_err();
    assert!(matches!(err, PhaseError::InvalidDivisor(_)), "{err}");
}

#[test]
fn void_ratio_from_saturation_relation() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        water_content: Some(20.0),
        saturation: Some(60.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_close("e", finite(out.void_ratio), 0.9, 1e-9);
    assert_close("n", out.porosity, 47.37, 1e-9);
}

#[test]
fn specific_gravity_back_derived_from_dry_unit_weight() {
    let out = resolve(&SampleInput {
        dry_unit_weight: Some(13.0),
        void_ratio: Some(1.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_close("Gs", out.specific_gravity, 2.6, 1e-9);
    assert_close("γs", out.solids_unit_weight, 26.0, 1e-9);
    assert_close("n", out.porosity, 50.0, 1e-9);
}

#[test]
fn porosity_gives_void_ratio_then_saturation() {
    let out = resolve(&SampleInput {
        porosity: Some(40.0),
        specific_gravity: Some(2.65),
        water_content: Some(12.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_close("e", finite(out.void_ratio), 0.6667, 1e-9);
    assert_close("S", out.saturation, 47.7, 1e-9);
    assert_close("γd", out.dry_unit_weight, 15.9, 1e-9);
    assert_close("n", out.porosity, 40.0, 1e-9);
}

#[test]
fn solids_unit_weight_alone_gives_gs_and_void_ratio() {
    let out = resolve(&SampleInput {
        solids_unit_weight: Some(26.5),
        dry_unit_weight: Some(16.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_close("Gs", out.specific_gravity, 2.65, 1e-9);
    assert_close("e", finite(out.void_ratio), 0.6563, 1e-9);
    // 입력한 γs는 그대로 유지된다
    assert_close("γs", out.solids_unit_weight, 26.5, 1e-9);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn fired_rules_and_advisory_are_logged() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        resolve(&lab_sample()).expect("resolve");
    });

    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("DEBUG"), "{logs}");
    assert!(logs.contains("water_content_from_masses"), "{logs}");
    assert!(logs.contains("WARN"), "{logs}");
}

#[test]
fn standard_water_unit_weight_is_accepted() {
    let out = resolve(&SampleInput {
        water_unit_weight: Some(9.81),
        ..lab_sample()
    })
    .expect("resolve");
    assert_close("γnat", out.natural_unit_weight, 14.764, 1e-9);
}

#[test]
fn volume_is_rebuilt_from_mass_and_unit_weight() {
    let out = resolve(&SampleInput {
        total_mass: Some(150.5),
        natural_unit_weight: Some(15.05),
        water_content: Some(15.0),
        specific_gravity: Some(2.7),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_close("V", out.total_volume, 100.0, 1e-9);
    assert_close("Ms", out.solids_mass, 150.5 / 1.15, 0.01);
    assert!(out.air_volume.is_some());
}

#[test]
fn normalized_phase_diagram() {
    let out = resolve(&SampleInput {
        specific_gravity: Some(2.7),
        void_ratio: Some(0.9),
        saturation: Some(60.0),
        ..SampleInput::default()
    })
    .expect("resolve");
    assert_eq!(out.solids_volume_norm, 1.0);
    assert_close("Vw/Vs", out.water_volume_norm, 0.54, 1e-9);
    assert_close("Va/Vs", out.air_volume_norm, 0.36, 1e-9);
    assert_close("Ws/Vs", out.solids_weight_norm, 2.7, 1e-9);
    assert_close("Ww/Vs", out.water_weight_norm, 0.54, 1e-9);
}

#[test]
fn invalid_inputs_are_rejected() {
    for input in [
        SampleInput {
            saturation: Some(120.0),
            ..SampleInput::default()
        },
        SampleInput {
            max_void_ratio: Some(0.5),
            min_void_ratio: Some(0.5),
            ..SampleInput::default()
        },
        SampleInput {
            water_unit_weight: Some(0.0),
            ..SampleInput::default()
        },
        SampleInput {
            void_ratio: Some(-0.2),
            ..SampleInput::default()
        },
    ] {
        let err = resolve(&input).unwrap_err();
        assert!(matches!(err, PhaseError::InvalidInput(_)), "{err}");
    }
}

#[test]
fn empty_input_resolves_to_empty_result() {
    let out = resolve(&SampleInput::default()).expect("nothing to derive is fine");
    assert!(out.void_ratio.is_none());
    assert!(out.natural_unit_weight.is_none());
    assert!(out.advisory.is_none());
}
