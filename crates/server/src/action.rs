use serde::Deserialize;
use sim::Reactor;

use crate::error::ApiError;

/// Body of `POST /api/action`.
#[derive(Debug, Deserialize)]
struct ActionRequest {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    PowerOn,
    PowerOff,
    Scram,
    ToggleAuto,
    Refuel,
    SetFissionRate(f64),
    SetTurbineOutput(f64),
    SetPowerLoad(f64),
}

impl Action {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let req: ActionRequest = serde_json::from_slice(body)?;
        let value = req.value.unwrap_or(0.0);
        let action = match req.kind.as_str() {
            "powerOn" => Action::PowerOn,
            "powerOff" => Action::PowerOff,
            "scram" => Action::Scram,
            "toggleAuto" => Action::ToggleAuto,
            "refuel" => Action::Refuel,
            "setFissionRate" => Action::SetFissionRate(value),
            "setTurbineOutput" => Action::SetTurbineOutput(value),
            "setPowerLoad" => Action::SetPowerLoad(value),
            _ => return Err(ApiError::UnknownAction(req.kind)),
        };
        Ok(action)
    }

    pub fn apply(self, reactor: &Reactor) {
        match self {
            Action::PowerOn => reactor.power_on(),
            Action::PowerOff => reactor.power_off(),
            Action::Scram => reactor.scram(),
            Action::ToggleAuto => reactor.toggle_auto(),
            Action::Refuel => reactor.refuel(),
            Action::SetFissionRate(v) => {
                reactor.set_fission_rate(v);
            }
            Action::SetTurbineOutput(v) => {
                reactor.set_turbine_output(v);
            }
            Action::SetPowerLoad(v) => reactor.set_power_load(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!(Action::parse(br#"{"type":"scram"}"#).unwrap(), Action::Scram);
        assert_eq!(
            Action::parse(br#"{"type":"setFissionRate","value":42}"#).unwrap(),
            Action::SetFissionRate(42.0)
        );
        assert_eq!(
            Action::parse(br#"{"type":"setPowerLoad"}"#).unwrap(),
            Action::SetPowerLoad(0.0)
        );
        assert_eq!(
            Action::parse(br#"{"type":"refuel","value":null,"extra":1}"#).unwrap(),
            Action::Refuel
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Action::parse(b"{not json"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            Action::parse(br#"{"type":"setFissionRate","value":"high"}"#),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            Action::parse(br#"{"type":"eject"}"#),
            Err(ApiError::UnknownAction(kind)) if kind == "eject"
        ));
        assert!(matches!(
            Action::parse(br#"{}"#),
            Err(ApiError::UnknownAction(_))
        ));
    }
}
