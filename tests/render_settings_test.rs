use realistic_render::{
    pipelines::tonemap::ToneMappingPass,
    render::{RendererSettings, ShadowMapType, Sizes, ToneMapping},
};

#[test]
fn should_derive_logical_sizes_and_pixel_ratio() {
    let sizes = Sizes::from_physical([1600, 1200], 2.0).expect("non zero size");
    assert_eq!(sizes.width, 800);
    assert_eq!(sizes.height, 600);
    assert_eq!(sizes.pixel_ratio, 2.0);
    assert_eq!(sizes.render_size(), [1600, 1200]);
    assert!((sizes.aspect() - 4.0 / 3.0).abs() < f32::EPSILON);
}

#[test]
fn should_cap_the_pixel_ratio_at_two() {
    let sizes = Sizes::from_physical([3000, 1500], 3.0).expect("non zero size");
    assert_eq!((sizes.width, sizes.height), (1000, 500));
    assert_eq!(sizes.pixel_ratio, 2.0);
    assert_eq!(sizes.render_size(), [2000, 1000]);
}

#[test]
fn should_ignore_zero_sized_windows() {
    assert_eq!(Sizes::from_physical([0, 600], 1.0), None);
    assert_eq!(Sizes::from_physical([800, 0], 1.0), None);
}

#[test]
fn should_name_tone_mapping_operators_in_shader_order() {
    let names: Vec<_> = ToneMapping::ALL.iter().map(|t| t.name()).collect();
    assert_eq!(names, ["No", "Linear", "Reinhard", "Cineon", "ACESFilmic"]);
    for (i, operator) in ToneMapping::ALL.into_iter().enumerate() {
        assert_eq!(operator.index(), i);
        assert_eq!(ToneMapping::from_index(i), operator);
    }
    assert_eq!(ToneMapping::from_index(42), ToneMapping::AcesFilmic);
    assert_eq!(ToneMapping::default(), ToneMapping::No);
}

#[test]
fn should_widen_the_kernel_for_softer_shadows() {
    assert_eq!(ShadowMapType::Basic.kernel_radius(), 0);
    assert_eq!(ShadowMapType::Pcf.kernel_radius(), 1);
    assert_eq!(ShadowMapType::PcfSoft.kernel_radius(), 2);
    assert_eq!(ShadowMapType::default(), ShadowMapType::Pcf);
}

#[test]
fn should_linearise_hex_clear_colours() {
    let mut settings = RendererSettings::default();
    assert!(!settings.shadow_map_enabled);
    assert_eq!(settings.tone_mapping_exposure, 1.0);

    settings.set_clear_hex(0xffffff);
    assert_eq!(settings.clear_colour, wgpu::Color::WHITE);

    settings.set_clear_hex(0x211d20);
    let c = settings.clear_colour;
    assert!((c.r - 0.0152).abs() < 1e-3, "{c:?}");
    assert!((c.g - 0.0123).abs() < 1e-3, "{c:?}");
    assert!((c.b - 0.0164).abs() < 1e-3, "{c:?}");
    assert_eq!(c.a, 1.0);
}

#[test]
fn should_composite_the_resolved_hdr_target_as_premultiplied() {
    // Edge pixels of the resolved target are already weighted by coverage
    assert_eq!(ToneMappingPass::BLEND, wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING);
    assert_ne!(ToneMappingPass::BLEND, wgpu::BlendState::ALPHA_BLENDING);
}
