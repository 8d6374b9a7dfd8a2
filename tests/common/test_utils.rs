use realistic_render::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::{Render, Sizes},
};

pub(crate) type Image = image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>;

type Setup<S> = Box<dyn Fn(&mut Context, &mut S)>;
type Validate<S> = Box<dyn Fn(&Context, &mut S, u32, &mut Image) -> Result<ImageTestResult, anyhow::Error>>;

/// Renders whatever `render` returns and hands every frame to `validate`
/// together with the number of updates so far.
pub(crate) struct TestRender<S> {
    setup: Setup<S>,
    render: for<'a> fn(&'a mut S) -> Render<'a>,
    validate: Validate<S>,
    frames: u32,
}

impl<S> TestRender<S> {
    pub(crate) fn new(
        setup: impl Fn(&mut Context, &mut S) + 'static,
        render: for<'a> fn(&'a mut S) -> Render<'a>,
        validate: impl Fn(&Context, &mut S, u32, &mut Image) -> Result<ImageTestResult, anyhow::Error>
        + 'static,
    ) -> Self {
        Self {
            setup: Box::new(setup),
            render,
            validate: Box::new(validate),
            frames: 0,
        }
    }
}

impl<S> GraphicsFlow<S, ()> for TestRender<S> {
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, ()> {
        (self.setup)(ctx, state);
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut S, _: std::time::Duration) -> Out<S, ()> {
        self.frames += 1;
        Out::Empty
    }

    fn on_resize(&mut self, _: &Context, _: &mut S, _: Sizes) -> Out<S, ()> {
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut S, _: &realistic_render::DeviceEvent) -> Out<S, ()> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut S, _: &realistic_render::WindowEvent) -> Out<S, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut S, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'a>(&'a self, _: &Context, state: &'a mut S) -> Render<'a> {
        (self.render)(state)
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut S,
        texture: &mut Image,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, self.frames, texture)
    }
}

/// `true` if both pixels hold the same colour within one step per channel,
/// whether the surface stores RGBA or BGRA.
pub(crate) fn same_colour(pixel: &image::Rgba<u8>, rgb: [u8; 3]) -> bool {
    let near = |a: u8, b: u8| a.abs_diff(b) <= 1;
    near(pixel[1], rgb[1])
        && ((near(pixel[0], rgb[0]) && near(pixel[2], rgb[2]))
            || (near(pixel[0], rgb[2]) && near(pixel[2], rgb[0])))
}

#[macro_export]
macro_rules! golden_image_test {
    ($state:ty, $graphics_elem:expr) => {{
        use realistic_render::flow::FlowConsturctor;
        use realistic_render::flow::GraphicsFlow;
        let constructor: FlowConsturctor<$state, ()> = Box::new(|_| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<$state, ()>> = Box::new($graphics_elem);
                g_flow
            })
        });

        realistic_render::flow::run(vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
