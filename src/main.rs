use pubsub::{BusConfig, ConfigError, EventBus};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ConfigError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pubsub=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BusConfig::from_env()?;
    info!(fault_policy = %config.fault_policy, "Starting product launch demo");

    let mut bus: EventBus<Value> = EventBus::with_config(config);

    let iphone13_a = bus.subscribe_fn("iphone13", |data| {
        info!(%data, "Subscriber A: I am interested in iphone13");
    });
    bus.subscribe_fn("iphone13", |data| {
        info!(%data, "Subscriber B: I am interested in iphone13");
    });
    bus.subscribe_fn("iphone15", |data| {
        info!(%data, "Subscriber A: I am interested in iphone15");
    });

    let iphone13 = json!({ "name": "iphone13", "price": 1000 });
    let iphone15 = json!({ "name": "iphone15", "price": 1500 });

    info!("Before A unsubscribes");
    bus.publish("iphone13", &iphone13);
    bus.publish("iphone15", &iphone15);

    bus.cancel(&iphone13_a);
    info!("After A unsubscribes");

    bus.publish("iphone13", &iphone13);

    Ok(())
}
