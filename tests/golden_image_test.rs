#[cfg(feature = "integration-tests")]
#[macro_use]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_the_placeholder_over_the_clear_colour() {
    use common::test_utils::{TestRender, same_colour};
    use realistic_render::{
        context::Context,
        experience::{CLEAR_COLOUR, Experience},
        flow::ImageTestResult,
        render::Render,
    };

    fn experience(state: &mut Experience) -> Render<'_> {
        Render::Scene {
            scene: &mut state.scene,
            camera: &state.camera,
            settings: &state.settings,
        }
    }

    let clear = [
        (CLEAR_COLOUR >> 16) as u8,
        (CLEAR_COLOUR >> 8) as u8,
        CLEAR_COLOUR as u8,
    ];

    golden_image_test!(
        Experience,
        TestRender::new(
            |_: &mut Context, _: &mut Experience| {},
            experience,
            move |ctx, _, frames, texture| {
                if frames < 2 {
                    return Ok(ImageTestResult::Waiting);
                }
                if !ctx.config.format.is_srgb() {
                    log::warn!("skipping colour checks on a {:?} surface", ctx.config.format);
                    return Ok(ImageTestResult::Passed);
                }
                let corner = texture.get_pixel(0, 0);
                assert!(same_colour(corner, clear), "corner is {corner:?}");

                let centre = texture.get_pixel(texture.width() / 2, texture.height() / 2);
                assert!(!same_colour(centre, clear), "the box is missing");
                assert_eq!(centre[3], 255);
                Ok(ImageTestResult::Passed)
            },
        )
    );
}
