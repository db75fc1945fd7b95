use std::sync::Arc;
use std::time::Duration;

use sim::Reactor;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::hub::{Frame, Hub};

/// Advances the model on a fixed cadence and publishes changed snapshots.
///
/// Simulated time moves by `dt` per tick regardless of how long the tick
/// actually took.
pub struct TickDriver {
    reactor: Arc<Reactor>,
    hub: Arc<Hub>,
    dt: f64,
    last: String,
}

impl TickDriver {
    pub fn new(reactor: Arc<Reactor>, hub: Arc<Hub>, dt: f64) -> Self {
        Self {
            reactor,
            hub,
            dt,
            last: String::new(),
        }
    }

    /// Run one tick. Returns true if a frame was published.
    pub fn tick(&mut self) -> bool {
        self.reactor.advance(self.dt);
        let json = match serde_json::to_string(&self.reactor.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode snapshot");
                return false;
            }
        };
        if json == self.last {
            return false;
        }
        self.hub.publish(Frame::from(json.as_str()));
        self.last = json;
        true
    }

    pub async fn run(mut self, period: Duration) {
        info!(?period, dt = self.dt, "tick loop started");
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim::{GridLoadConfig, ReactorConfig, ReactorParams, ReactorState};

    #[tokio::test]
    async fn publishes_only_changes() {
        // Cold, dead core on a flat grid: nothing moves after the first tick.
        let mut state = ReactorState::balanced(&ReactorParams::default(), 0.0);
        state.is_powered_on = false;
        state.temperature = 0.0;
        let cfg = ReactorConfig {
            grid: GridLoadConfig::steady(0.0),
            seed: Some(1),
            ..ReactorConfig::default()
        };
        let reactor = Arc::new(Reactor::from_state(cfg, state).unwrap());
        let hub = Arc::new(Hub::new());
        let mut sub = hub.subscribe();
        let mut driver = TickDriver::new(Arc::clone(&reactor), Arc::clone(&hub), 0.2);

        assert!(driver.tick());
        let frame = sub.recv().await.unwrap();
        let parsed: ReactorState = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed, reactor.snapshot());

        assert!(!driver.tick());
        assert!(!driver.tick());

        reactor.refuel();
        reactor.toggle_auto();
        assert!(driver.tick());
        let frame = sub.recv().await.unwrap();
        assert!(frame.contains(r#""isAutoControl":false"#));
    }

    #[tokio::test]
    async fn cooling_core_publishes_every_tick() {
        let reactor = Arc::new(Reactor::with_config(ReactorConfig::with_seed(4)).unwrap());
        let hub = Arc::new(Hub::new());
        let mut driver = TickDriver::new(Arc::clone(&reactor), hub, 0.2);
        assert!(driver.tick());

        // A cooling core changes every tick.
        reactor.scram();
        let published = (0..10).filter(|_| driver.tick()).count();
        assert_eq!(published, 10);
    }
}
