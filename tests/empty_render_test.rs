#[cfg(feature = "integration-tests")]
#[macro_use]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use common::test_utils::{TestRender, same_colour};
    use realistic_render::{context::Context, flow::ImageTestResult, render::Render};

    #[derive(Default)]
    struct Nothing;

    fn nothing(_: &mut Nothing) -> Render<'_> {
        Render::None
    }

    golden_image_test!(
        Nothing,
        TestRender::new(
            |ctx: &mut Context, _: &mut Nothing| ctx.clear_colour = wgpu::Color::WHITE,
            nothing,
            |_, _, frames, texture| {
                if frames < 2 {
                    return Ok(ImageTestResult::Waiting);
                }
                for pixel in texture.pixels() {
                    assert!(same_colour(pixel, [255, 255, 255]), "{pixel:?}");
                    assert_eq!(pixel[3], 255);
                }
                Ok(ImageTestResult::Passed)
            },
        )
    );
}
