//! Chains the scene pass and the post-processing effects of a frame.

use crate::camera::Camera3d;
use crate::context::Context;
use crate::controls::Resizable;
use crate::post_processing::post_processing_effect::{PostProcessingContext, PostProcessingEffect};
use crate::post_processing::render_pass::ScenePass;
use crate::resource::OffscreenBuffers;
use crate::scene::SceneNode3d;

/// Renders the scene into an HDR buffer, then runs each effect in the order
/// they were added.
///
/// Effects ping-pong between two HDR buffers. The last effect writes the
/// output view directly, so it should be an
/// [`OutputPass`](crate::post_processing::OutputPass) or another effect
/// returning `true` from [`PostProcessingEffect::needs_swap`].
pub struct EffectComposer {
    render_pass: ScenePass,
    effects: Vec<Box<dyn PostProcessingEffect>>,
    width: u32,
    height: u32,
    // [scene target with depth, ping-pong target]
    targets: Option<[OffscreenBuffers; 2]>,
}

impl EffectComposer {
    /// A composer for frames of `width`x`height` pixels.
    ///
    /// No GPU resource is created before the first render.
    pub fn new(render_pass: ScenePass, width: u32, height: u32) -> EffectComposer {
        EffectComposer {
            render_pass,
            effects: Vec::new(),
            width: width.max(1),
            height: height.max(1),
            targets: None,
        }
    }

    /// Appends an effect to the chain.
    pub fn add_pass<E: PostProcessingEffect + 'static>(&mut self, mut effect: E) {
        effect.set_size(self.width, self.height);
        self.effects.push(Box::new(effect));
    }

    /// The number of passes, the scene pass included.
    pub fn num_passes(&self) -> usize {
        self.effects.len() + 1
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn render_pass(&self) -> &ScenePass {
        &self.render_pass
    }

    #[inline]
    pub fn render_pass_mut(&mut self) -> &mut ScenePass {
        &mut self.render_pass
    }

    /// Renders one frame of `scene` seen by `camera` into `output`.
    pub fn render(
        &mut self,
        scene: &SceneNode3d,
        camera: &dyn Camera3d,
        output: &wgpu::TextureView,
        output_format: wgpu::TextureFormat,
    ) {
        let ctxt = Context::get();
        let (width, height) = (self.width, self.height);

        let targets = self.targets.get_or_insert_with(|| {
            log::debug!("allocating the composer buffers for {width}x{height}");
            [
                OffscreenBuffers::hdr(width, height, true),
                OffscreenBuffers::hdr(width, height, false),
            ]
        });
        for target in targets.iter_mut() {
            target.resize(width, height);
        }

        let mut encoder = ctxt.create_command_encoder(Some("composer_encoder"));
        self.render_pass
            .render(&mut encoder, &targets[0], scene, camera);

        let [first, second] = &*targets;
        let mut read_first = true;
        let num_effects = self.effects.len();

        for (i, effect) in self.effects.iter_mut().enumerate() {
            let is_last = i + 1 == num_effects;
            let (source, destination) = if read_first {
                (first, second)
            } else {
                (second, first)
            };

            let mut context = PostProcessingContext {
                encoder: &mut encoder,
                output_view: if is_last {
                    output
                } else {
                    &destination.color_view
                },
                output_format: if is_last {
                    output_format
                } else {
                    destination.format
                },
            };
            effect.draw(source, &mut context);

            if effect.needs_swap() && !is_last {
                read_first = !read_first;
            }
        }

        ctxt.submit(Some(encoder.finish()));
    }
}

impl Resizable for EffectComposer {
    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }

        self.width = width;
        self.height = height;
        for effect in &mut self.effects {
            effect.set_size(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordedSizes(Rc<RefCell<Vec<(u32, u32)>>>);

    impl PostProcessingEffect for RecordedSizes {
        fn set_size(&mut self, width: u32, height: u32) {
            self.0.borrow_mut().push((width, height));
        }

        fn draw(&mut self, _: &OffscreenBuffers, _: &mut PostProcessingContext) {}
    }

    #[test]
    fn added_passes_learn_the_current_size() {
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let mut composer = EffectComposer::new(ScenePass::new(), 640, 480);
        composer.add_pass(RecordedSizes(sizes.clone()));

        assert_eq!(composer.num_passes(), 2);
        assert_eq!(*sizes.borrow(), vec![(640, 480)]);
    }

    #[test]
    fn resizing_to_the_same_size_twice_notifies_once() {
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let mut composer = EffectComposer::new(ScenePass::new(), 640, 480);
        composer.add_pass(RecordedSizes(sizes.clone()));

        composer.resize(800, 600);
        composer.resize(800, 600);
        composer.resize(640, 480);

        assert_eq!(*sizes.borrow(), vec![(640, 480), (800, 600), (640, 480)]);
        assert_eq!(composer.size(), (640, 480));
    }

    #[test]
    fn construction_allocates_nothing() {
        let composer = EffectComposer::new(ScenePass::new().with_shadows(true), 0, 0);
        assert_eq!(composer.size(), (1, 1));
        assert!(composer.targets.is_none());
        assert!(composer.render_pass().shadows_enabled());
    }
}
