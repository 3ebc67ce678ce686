//! Post-processing: the composer, the scene pass and the image-space effects.

pub use self::bloom::{level_sizes, BloomPass, BloomSettings, BLOOM_LEVELS};
pub use self::composer::EffectComposer;
pub use self::output::{OutputPass, ToneMapping};
pub use self::post_processing_effect::{PostProcessingContext, PostProcessingEffect};
pub use self::render_pass::ScenePass;

mod bloom;
mod composer;
pub(crate) mod fullscreen;
mod output;
mod post_processing_effect;
mod render_pass;
