use anyhow::{Context, bail};
use atomics::ElementKind;
use atomics::typed_array::MAX_ELEMENT_COUNT;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

pub use common::Environment;

/// Tokens are `1..=agents` and must fit the narrowest signed element.
pub const MAX_AGENTS: u32 = i8::MAX as u32;

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub environment: Environment,
    pub agents: u32,
    pub iterations: u64,
    pub element_kind: ElementKind,
    pub length: usize,
}

impl StressConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();
        let agents = var_or("STRESS_AGENTS", 4)?;
        let iterations = var_or("STRESS_ITERATIONS", 100_000)?;
        let element_kind = var_or("STRESS_ELEMENT_KIND", ElementKind::Int32)?;
        let length = var_or("STRESS_LENGTH", 16)?;

        let config = Self {
            environment,
            agents,
            iterations,
            element_kind,
            length,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.agents == 0 || self.agents > MAX_AGENTS {
            bail!("STRESS_AGENTS must be between 1 and {MAX_AGENTS}, got {}", self.agents);
        }
        if self.element_kind.atomic_kind().is_none() {
            bail!(
                "STRESS_ELEMENT_KIND must be an integer kind, got {}",
                self.element_kind.name()
            );
        }
        if self.length == 0 || self.length > MAX_ELEMENT_COUNT {
            bail!(
                "STRESS_LENGTH must be between 1 and {MAX_ELEMENT_COUNT}, got {}",
                self.length
            );
        }
        Ok(())
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            agents: 4,
            iterations: 1_000,
            element_kind: ElementKind::Int32,
            length: 8,
        }
    }
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
