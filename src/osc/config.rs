//! OSC configuration — listen port and address mappings, the `osc:` section of the config file.

use serde::{Deserialize, Serialize};

use super::mapping::{OscMapping, OscTarget};

/// OSC listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscConfig {
    /// UDP port to listen on.
    #[serde(default = "default_port")]
    pub listen_port: u16,
    /// Start the listener at launch.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Mapping rules from OSC addresses to control events.
    #[serde(default = "OscConfig::default_mappings")]
    pub mappings: Vec<OscMapping>,
}

fn default_port() -> u16 {
    9000
}

fn default_enabled() -> bool {
    true
}

impl OscConfig {
    /// Default mappings: /hands, /hands/lost, /play, /start, /stop, /key, /quantize, /handedness.
    pub fn default_mappings() -> Vec<OscMapping> {
        [
            ("/hands", OscTarget::Hands),
            ("/hands/lost", OscTarget::HandsLost),
            ("/play", OscTarget::PlayStop),
            ("/start", OscTarget::Start),
            ("/stop", OscTarget::Stop),
            ("/key", OscTarget::Key),
            ("/quantize", OscTarget::Quantize),
            ("/handedness", OscTarget::Handedness),
        ]
        .into_iter()
        .map(|(addr, target)| OscMapping {
            address_pattern: addr.to_string(),
            target,
        })
        .collect()
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            listen_port: default_port(),
            enabled: default_enabled(),
            mappings: Self::default_mappings(),
        }
    }
}
