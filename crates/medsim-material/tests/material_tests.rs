//! Integration tests for medsim-material.

use medsim_math::{DMat3, DQuat, DVec3};
use medsim_material::{
    ConstitutiveModel, CorotationalModel, FemMaterialConfig, FemMaterialType, LinearModel,
    NeoHookeanModel, StVKModel,
};

fn lame() -> medsim_material::LameParameters {
    FemMaterialConfig::default().lame()
}

fn sample_gradient() -> DMat3 {
    DMat3::from_cols(
        DVec3::new(1.1, 0.05, 0.0),
        DVec3::new(0.2, 0.9, -0.1),
        DVec3::new(0.0, 0.1, 1.05),
    )
}

/// Compares P against a central finite difference of ψ.
fn assert_stress_is_energy_gradient(model: &dyn ConstitutiveModel, f: DMat3) {
    let h = 1e-6;
    let p = model.evaluate(&f, lame()).unwrap().stress;
    for col in 0..3 {
        for row in 0..3 {
            let mut plus = f;
            let mut minus = f;
            plus.col_mut(col)[row] += h;
            minus.col_mut(col)[row] -= h;
            let e_plus = model.evaluate(&plus, lame()).unwrap().energy;
            let e_minus = model.evaluate(&minus, lame()).unwrap().energy;
            let fd = (e_plus - e_minus) / (2.0 * h);
            let analytic = p.col(col)[row];
            assert!(
                (fd - analytic).abs() < 1e-4 * (1.0 + analytic.abs()),
                "{}: P[{row}][{col}] = {analytic}, finite difference = {fd}",
                model.name()
            );
        }
    }
}

// ─── Parameters ───────────────────────────────────────────────

#[test]
fn default_lame_parameters() {
    let lame = lame();
    assert!((lame.mu - 1000.0 / 2.4).abs() < 1e-9);
    assert!((lame.lambda - 200.0 / 0.72).abs() < 1e-9);
}

#[test]
fn validate_ranges() {
    assert!(FemMaterialConfig::default().validate().is_ok());
    assert!(FemMaterialConfig::new(0.0, 0.2, FemMaterialType::Linear).validate().is_err());
    assert!(FemMaterialConfig::new(1000.0, 0.5, FemMaterialType::Linear).validate().is_err());
    assert!(FemMaterialConfig::new(1000.0, -1.0, FemMaterialType::Linear).validate().is_err());
}

#[test]
fn config_serde_defaults_and_tags() {
    let config: FemMaterialConfig =
        serde_json::from_str(r#"{"young_modulus": 5000.0, "material_type": "neo_hookean"}"#).unwrap();
    assert_eq!(config.young_modulus, 5000.0);
    assert_eq!(config.poisson_ratio, 0.2);
    assert_eq!(config.material_type, FemMaterialType::NeoHookean);

    let json = serde_json::to_string(&FemMaterialConfig::default()).unwrap();
    assert!(json.contains("\"stvk\""));
}

#[test]
fn tag_selects_model() {
    assert_eq!(FemMaterialType::Linear.model().name(), "linear");
    assert_eq!(FemMaterialType::Corotation.model().name(), "corotation");
    assert_eq!(FemMaterialType::StVK.model().name(), "stvk");
    assert_eq!(FemMaterialType::NeoHookean.model().name(), "neo_hookean");
}

// ─── Models ───────────────────────────────────────────────────

#[test]
fn rest_state_is_stress_free() {
    for tag in [
        FemMaterialType::Linear,
        FemMaterialType::Corotation,
        FemMaterialType::StVK,
        FemMaterialType::NeoHookean,
    ] {
        let result = tag.model().evaluate(&DMat3::IDENTITY, lame()).unwrap();
        assert!(result.energy.abs() < 1e-9, "{tag:?} energy {}", result.energy);
        assert!(result.stress.abs_diff_eq(DMat3::ZERO, 1e-9), "{tag:?} stress");
    }
}

#[test]
fn rotation_invariance() {
    let rotation = DMat3::from_quat(DQuat::from_axis_angle(DVec3::new(1.0, 2.0, 0.5).normalize(), 0.7));
    for model in [
        &CorotationalModel as &dyn ConstitutiveModel,
        &StVKModel,
        &NeoHookeanModel,
    ] {
        let energy = model.evaluate(&rotation, lame()).unwrap().energy;
        assert!(energy.abs() < 1e-6, "{} energy under rotation: {energy}", model.name());
    }
    let linear = LinearModel.evaluate(&rotation, lame()).unwrap().energy;
    assert!(linear > 1.0, "linear model should penalize rotation, got {linear}");
}

#[test]
fn stretch_stores_energy() {
    let stretch = DMat3::from_diagonal(DVec3::new(1.2, 1.0, 1.0));
    for model in [
        &LinearModel as &dyn ConstitutiveModel,
        &CorotationalModel,
        &StVKModel,
        &NeoHookeanModel,
    ] {
        let result = model.evaluate(&stretch, lame()).unwrap();
        assert!(result.energy > 0.0, "{}", model.name());
        assert!(result.stress.x_axis.x > 0.0, "{} should resist stretch", model.name());
    }
}

#[test]
fn linear_stress_is_energy_gradient() {
    assert_stress_is_energy_gradient(&LinearModel, sample_gradient());
}

#[test]
fn stvk_stress_is_energy_gradient() {
    assert_stress_is_energy_gradient(&StVKModel, sample_gradient());
}

#[test]
fn neo_hookean_stress_is_energy_gradient() {
    assert_stress_is_energy_gradient(&NeoHookeanModel, sample_gradient());
}

#[test]
fn neo_hookean_rejects_inverted_elements() {
    let inverted = DMat3::from_diagonal(DVec3::new(-1.0, 1.0, 1.0));
    assert!(NeoHookeanModel.evaluate(&inverted, lame()).is_none());
    assert!(StVKModel.evaluate(&inverted, lame()).is_some());
}
