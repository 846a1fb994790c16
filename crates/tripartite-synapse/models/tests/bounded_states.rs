// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Property tests: gate and fraction variables stay in [0, 1] and vesicle
//! fractions sum to one for arbitrary input traces.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tripartite_synapse_models::*;

fn dt() -> Time {
    Time::from_millis(0.05)
}

fn in_unit(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn glutamate_release_bounded(
        trace in prop::collection::vec(0.0f64..10_000.0, 1..400),
        modulation in 0.0f64..0.01,
    ) {
        let mut glu = GlutamateRelease::new(GlutamateReleaseParameters::default()).unwrap();
        for c_um in trace {
            glu.step(dt(), Concentration::from_micromolar(c_um), modulation);
            let s = glu.state();
            prop_assert!(s.sensor.iter().all(|&x| in_unit(x)));
            prop_assert!(s.sensor_total() <= 1.0 + 1e-12);
            let v = s.vesicles;
            prop_assert!(in_unit(v.releasable()) && in_unit(v.effective()));
            prop_assert!(v.inactive() >= -1e-12);
            prop_assert!((v.releasable() + v.effective() + v.inactive() - 1.0).abs() < 1e-12);
            prop_assert!(s.cleft_glutamate.molar() >= 0.0);
        }
    }

    #[test]
    fn gliotransmitter_bounded(trace in prop::collection::vec(0.0f64..5e-6, 1..400)) {
        let mut glio = GliotransmitterRelease::new(GliotransmitterParameters::default()).unwrap();
        for c in trace {
            glio.step(dt(), Concentration::from_molar(c));
            let s = glio.state();
            prop_assert!(s.gates.iter().all(|&g| in_unit(g)));
            prop_assert!(in_unit(s.release_probability()));
            prop_assert!(s.vesicles.inactive() >= -1e-12);
            prop_assert!(s.extracellular_glutamate.molar() >= 0.0);
        }
    }

    #[test]
    fn astrocyte_bounded(trace in prop::collection::vec(0.0f64..1e-3, 1..400)) {
        let mut astro = AstrocyteCore::new(AstrocyteParameters::default()).unwrap();
        for g in trace {
            astro.step(dt(), Concentration::from_molar(g));
            let s = astro.state();
            prop_assert!(in_unit(s.gate));
            prop_assert!(s.calcium.molar() > 0.0);
            prop_assert!(s.ip3.molar() >= 0.0);
        }
    }

    #[test]
    fn presynaptic_calcium_bounded(
        trace in prop::collection::vec((-0.09f64..0.05, 0.0f64..1e-4), 1..400),
    ) {
        let mut ca = PresynapticCalcium::new(PresynapticCalciumParameters::default()).unwrap();
        for (v, g) in trace {
            ca.advance(dt(), Voltage::from_volts(v), Concentration::from_molar(g));
            let s = ca.state();
            prop_assert!(in_unit(s.vgcc_gate) && in_unit(s.ip3r_gate));
            prop_assert!(s.fast_calcium.molar() >= 0.0);
            prop_assert!(s.slow_calcium.molar() > 0.0);
            prop_assert!(s.er_calcium.molar() > 0.0);
        }
    }

    #[test]
    fn hh_gates_bounded_for_physiological_input(
        trace in prop::collection::vec(0.0f64..60.0, 1..2000),
    ) {
        let mut hh = PresynapticMembrane::new(HodgkinHuxleyParameters::default()).unwrap();
        for i in trace {
            hh.advance(dt(), CurrentDensity::from_microamps_per_cm2(i), CurrentDensity::ZERO);
            let s = hh.state();
            prop_assert!(in_unit(s.m) && in_unit(s.h) && in_unit(s.n));
            prop_assert!(s.voltage.is_finite());
        }
    }

    #[test]
    fn postsynaptic_bounded(
        trace in prop::collection::vec((0.0f64..1e-3, -0.1f64..0.05), 1..400),
        seed in any::<u64>(),
    ) {
        let mut post = PostsynapticMembrane::new(PostsynapticMembraneParameters::default()).unwrap();
        let mut ca = PostsynapticCalcium::new(PostsynapticCalciumParameters::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for (g, v) in trace {
            post.step(dt(), Concentration::from_molar(g), Current::ZERO);
            prop_assert!(in_unit(post.state().ampa_gate));
            let c = ca.step(dt(), Voltage::from_volts(v), post.ampa_current(), &mut rng);
            prop_assert!(c.molar() >= 1e-9);
            prop_assert!(ca.state().open_channels <= 12);
        }
    }
}
