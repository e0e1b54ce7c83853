//! Context configuration.
//!
//! A [`Config`] lets the caller mask out features the backend detected, for debugging or to work
//! around broken drivers. It can be built by hand or read from the `GLAZE_DEBUG` environment
//! variable, which holds a comma or space separated list of switches:
//!
//! | switch | effect |
//! | --- | --- |
//! | `disable-npot-textures` | masks [`Features::TEXTURE_NPOT`] |
//! | `disable-texture-3d` | masks [`Features::TEXTURE_3D`] |
//! | `disable-texture-rectangle` | masks [`Features::TEXTURE_RECTANGLE`] |
//! | `disable-offscreen` | masks [`Features::OFFSCREEN`] |
//! | `disable-sampler-objects` | masks [`Features::SAMPLER_OBJECTS`] |
//! | `disable-stencil` | masks [`Features::STENCIL_MASK`] |
//! | `disable-texture-queries` | masks [`Features::QUERY_TEXTURE_PARAMETERS`] |
//! | `viewport-scissor-workaround` | forces the viewport scissor workaround on |
//! | `no-viewport-scissor-workaround` | forces the viewport scissor workaround off |

use log::warn;
use std::env;

use crate::features::Features;

/// Name of the environment variable read by [`Config::from_env`].
pub const DEBUG_ENV_VAR: &str = "GLAZE_DEBUG";

/// Configuration applied on top of what the backend detects.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
  /// Features to remove from the detected set.
  pub disabled_features: Features,

  /// Force the viewport scissor workaround on (`Some(true)`) or off (`Some(false)`). `None` keeps
  /// whatever the backend detected.
  pub viewport_scissor_workaround: Option<bool>,
}

impl Config {
  /// Read the configuration from the `GLAZE_DEBUG` environment variable.
  ///
  /// A missing variable yields the default configuration.
  pub fn from_env() -> Self {
    match env::var(DEBUG_ENV_VAR) {
      Ok(switches) => Self::from_switches(&switches),
      Err(_) => Self::default(),
    }
  }

  /// Parse a list of debug switches.
  pub fn from_switches(switches: &str) -> Self {
    let mut config = Config::default();

    for switch in switches
      .split(|c: char| c == ',' || c.is_whitespace())
      .filter(|s| !s.is_empty())
    {
      match switch {
        "disable-npot-textures" => config.disabled_features |= Features::TEXTURE_NPOT,
        "disable-texture-3d" => config.disabled_features |= Features::TEXTURE_3D,
        "disable-texture-rectangle" => config.disabled_features |= Features::TEXTURE_RECTANGLE,
        "disable-offscreen" => config.disabled_features |= Features::OFFSCREEN,
        "disable-sampler-objects" => config.disabled_features |= Features::SAMPLER_OBJECTS,
        "disable-stencil" => config.disabled_features |= Features::STENCIL_MASK,
        "disable-texture-queries" => {
          config.disabled_features |= Features::QUERY_TEXTURE_PARAMETERS
        }
        "viewport-scissor-workaround" => config.viewport_scissor_workaround = Some(true),
        "no-viewport-scissor-workaround" => config.viewport_scissor_workaround = Some(false),
        _ => warn!("unknown {} switch: {}", DEBUG_ENV_VAR, switch),
      }
    }

    config
  }

  /// Apply the configuration to a detected feature set.
  pub fn apply(&self, detected: Features) -> Features {
    let mut features = detected - self.disabled_features;

    match self.viewport_scissor_workaround {
      Some(true) => features |= Features::VIEWPORT_SCISSOR_WORKAROUND,
      Some(false) => features -= Features::VIEWPORT_SCISSOR_WORKAROUND,
      None => (),
    }

    features
  }
}
