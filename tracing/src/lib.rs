use tracing::Level;
use tracing_subscriber::{
    filter::FromEnvError, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[cfg(feature = "tracy")]
use tracing_tracy::TracyLayer;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Init(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid RUST_LOG: {0}")]
    Filter(#[from] FromEnvError),
}

pub struct TracingBuilder {
    level: Level,
    ansi: bool,
}

impl Default for TracingBuilder {
    fn default() -> Self {
        TracingBuilder {
            level: Level::INFO,
            ansi: true,
        }
    }
}

impl TracingBuilder {
    /// Set the log level for all layers. RUST_LOG still has a higher
    /// priority over this value.
    pub fn level(mut self, level: Level) -> TracingBuilder {
        self.level = level;
        self
    }

    /// Disable colored output, e.g. when stderr is redirected to a file.
    pub fn disable_ansi(mut self) -> TracingBuilder {
        self.ansi = false;
        self
    }

    /// This will setup tracing based on the configuration passed in.
    /// It will setup a stderr writer output layer and a EnvFilter based on the provided log
    /// level (RUST_LOG still has a higher priority over the configured value).
    ///
    /// With the `tracy` feature, spans are additionally sent to a Tracy profiler.
    pub fn build(self) -> Result<(), Error> {
        let subscriber = tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(self.level.into())
                    .from_env()?,
            )
            .with(
                tracing_subscriber::fmt::Layer::new()
                    .with_writer(std::io::stderr)
                    .with_ansi(self.ansi)
                    .compact(),
            );

        #[cfg(feature = "tracy")]
        {
            subscriber.with(TracyLayer::default()).try_init()?;
        }
        #[cfg(not(feature = "tracy"))]
        {
            subscriber.try_init()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::TracingBuilder;

    #[test]
    fn builder_defaults_and_overrides() {
        let builder = TracingBuilder::default();
        assert_eq!(Level::INFO, builder.level);
        assert!(builder.ansi);

        let builder = builder.level(Level::TRACE).disable_ansi();
        assert_eq!(Level::TRACE, builder.level);
        assert!(!builder.ansi);
    }
}
