//! Command routing
//!
//! Maps one decoded [`Command`] onto the controller operation it names.
//! Stateless; initialization is the session's business.

use serde::Deserialize;
use tracing::debug;

use crate::controller::EqualizerController;
use crate::error::EqResult;
use crate::message::Command;

/// Apply `command` to the controller. Unknown kinds do nothing.
pub fn route(controller: &mut EqualizerController, command: &Command) -> EqResult<()> {
    match command {
        Command::Eq { frequency, gain } => controller.apply_band_gain(*frequency, *gain),
        Command::Preset { values } => controller.apply_preset(values).map(|_| ()),
        Command::Volume { value } => controller.set_volume(*value),
        Command::BassBoost { value } => controller.set_bass_boost(*value),
        Command::Reset => controller.reset(),
        Command::Power { enabled } => controller.set_power(*enabled),
        Command::Unknown => {
            debug!("Ignoring unknown command");
            Ok(())
        }
    }
}

/// Decode a raw message. Anything malformed becomes [`Command::Unknown`].
pub fn parse(message: &serde_json::Value) -> Command {
    match Command::deserialize(message) {
        Ok(command) => command,
        Err(e) => {
            debug!("Malformed command {}: {}", message, e);
            Command::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ChainConfig;
    use crate::error::EqError;
    use crate::settings::MemoryStore;
    use mqt_platform::{MediaElement, SoftwareBackend};
    use serde_json::json;

    fn ready_controller() -> EqualizerController {
        let mut controller = EqualizerController::new(
            Box::new(SoftwareBackend::new(48000.0)),
            Arc::new(MemoryStore::new()),
            ChainConfig::default(),
        )
        .unwrap();
        controller.initialize(&MediaElement::new(1)).unwrap();
        controller
    }

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!(
            parse(&json!({"kind": "EQ", "frequency": 1000, "gain": -3})),
            Command::Eq {
                frequency: 1000,
                gain: -3.0
            }
        );
        assert_eq!(parse(&json!({"kind": "VOLUME", "value": 0.5})), Command::Volume { value: 0.5 });
        assert_eq!(parse(&json!({"kind": "RESET"})), Command::Reset);
    }

    #[test]
    fn test_parse_malformed_is_unknown() {
        assert_eq!(parse(&json!({"kind": "FOO"})), Command::Unknown);
        assert_eq!(parse(&json!({"kind": "EQ", "frequency": "loud"})), Command::Unknown);
        assert_eq!(parse(&json!({"frequency": 32})), Command::Unknown);
        assert_eq!(parse(&json!([1, 2, 3])), Command::Unknown);
        assert_eq!(parse(&json!("RESET")), Command::Unknown);
    }

    #[test]
    fn test_route_eq_and_volume() {
        let mut controller = ready_controller();
        route(
            &mut controller,
            &Command::Eq {
                frequency: 4000,
                gain: 2.5,
            },
        )
        .unwrap();
        route(&mut controller, &Command::Volume { value: 0.5 }).unwrap();
        route(&mut controller, &Command::BassBoost { value: 3.0 }).unwrap();

        assert_eq!(controller.band_gain(4000).unwrap(), 2.5);
        assert_eq!(controller.volume().unwrap(), 0.5);
        assert_eq!(controller.bass_gain().unwrap(), 3.0);
    }

    #[test]
    fn test_route_preset_reset_power() {
        let mut controller = ready_controller();
        route(&mut controller, &Command::preset("treble").unwrap()).unwrap();
        assert_eq!(controller.band_gain(16000).unwrap(), 10.0);

        route(&mut controller, &Command::Reset).unwrap();
        assert_eq!(controller.band_gain(16000).unwrap(), 0.0);

        route(&mut controller, &Command::preset("bass").unwrap()).unwrap();
        route(&mut controller, &Command::Power { enabled: false }).unwrap();
        assert!(!controller.is_enabled());
        assert_eq!(controller.band_gain(32).unwrap(), 0.0);
    }

    #[test]
    fn test_route_unknown_changes_nothing() {
        let mut controller = ready_controller();
        controller.apply_band_gain(250, 1.0).unwrap();
        let before = controller.snapshot().unwrap();

        route(&mut controller, &Command::Unknown).unwrap();
        assert_eq!(controller.snapshot().unwrap(), before);
    }

    #[test]
    fn test_route_unknown_band_reports_target() {
        let mut controller = ready_controller();
        let result = route(
            &mut controller,
            &Command::Eq {
                frequency: 440,
                gain: 1.0,
            },
        );
        assert!(matches!(result, Err(EqError::UnknownTarget(_))));
    }
}
