use crate::builder::Configuration;

/// Internal validation, called automatically from [`crate::ConfigurationBuilder::build`].
///
/// Non-positive integers and unknown mode strings are rejected here, before
/// analysis begins — per §3, a bad configuration must never surface mid-pipeline.
pub(crate) fn validate(config: &Configuration) -> anyhow::Result<()> {
    if config.max_decision_points == 0 {
        anyhow::bail!("max_decision_points must be > 0");
    }
    if config.max_paths == 0 {
        anyhow::bail!("max_paths must be > 0");
    }
    if config.signal_max_discovery_depth == 0 {
        anyhow::bail!("signal_max_discovery_depth must be > 0");
    }

    // 2^max_decision_points must itself not silently overflow when later
    // compared against max_paths; reject configurations where the exponent
    // alone is unrepresentable.
    if config.max_decision_points >= usize::BITS as usize {
        anyhow::bail!(
            "max_decision_points ({}) is too large to enumerate on this platform",
            config.max_decision_points
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::ConfigurationBuilder;

    #[test]
    fn accepts_defaults() {
        assert!(ConfigurationBuilder::new().build().is_ok());
    }

    #[test]
    fn rejects_huge_decision_points() {
        let err = ConfigurationBuilder::new()
            .max_decision_points(usize::BITS as usize)
            .build();
        assert!(err.is_err());
    }
}
