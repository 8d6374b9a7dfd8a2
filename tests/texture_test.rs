use realistic_render::data_structures::texture::{Mapping, hdr_mip_chain, mip_level_count, to_half};

fn rgba(values: &[f32]) -> Vec<f32> {
    values.iter().flat_map(|&v| [v, v * 2.0, 0.0, 1.0]).collect()
}

#[test]
fn should_count_mip_levels_down_to_one_texel() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(2048, 1024), 12);
    assert_eq!(mip_level_count(5, 3), 3);
    assert_eq!(mip_level_count(0, 0), 1);
}

#[test]
fn should_average_the_hdr_panorama_down_to_its_mean() {
    let texels = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0];
    let levels = hdr_mip_chain(4, 2, &rgba(&texels));

    let sizes: Vec<_> = levels.iter().map(|(w, h, _)| (*w, *h)).collect();
    assert_eq!(sizes, [(4, 2), (2, 1), (1, 1)]);
    for (w, h, pixels) in &levels {
        assert_eq!(pixels.len(), (w * h * 4) as usize);
    }

    // 2x1: the left and right 2x2 blocks
    assert_eq!(levels[1].2[0], (1.0 + 2.0 + 5.0 + 6.0) / 4.0);
    assert_eq!(levels[1].2[4], (3.0 + 4.0 + 7.0 + 100.0) / 4.0);

    let mean = texels.iter().sum::<f32>() / texels.len() as f32;
    let last = &levels[2].2;
    assert!((last[0] - mean).abs() < 1e-4);
    assert!((last[1] - 2.0 * mean).abs() < 1e-4);
    assert_eq!(last[3], 1.0);
}

#[test]
fn should_keep_a_single_texel_as_is() {
    let levels = hdr_mip_chain(1, 1, &[0.5, 0.25, 0.125, 1.0]);
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].2, [0.5, 0.25, 0.125, 1.0]);
}

#[test]
fn should_saturate_bright_texels_instead_of_overflowing() {
    let sun = to_half(1.0e6);
    assert!(sun.to_f32().is_finite());
    assert_eq!(sun, half::f16::MAX);
    assert_eq!(to_half(-1.0e6), half::f16::MIN);

    assert_eq!(to_half(1.5).to_f32(), 1.5);
    assert_eq!(to_half(65504.0), half::f16::MAX);
}

#[test]
fn should_only_treat_equirectangular_maps_as_panoramas() {
    assert_eq!(Mapping::default(), Mapping::Uv);
    assert!(!Mapping::Uv.is_panorama());
    assert!(Mapping::EquirectangularReflection.is_panorama());
}
