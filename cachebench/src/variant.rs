const CONCURRENT_PREFIX: &str = "concurrent_";
const NON_CONCURRENT_PREFIX: &str = "non_concurrent_";
const DEVICE_AWARE: &str = "device_aware";

/// Removes the concurrency prefix from a config name, collapses repeated
/// underscores and trims underscores at both ends.
pub fn clean_config_name(config: &str) -> String {
    let config = config
        .strip_prefix(NON_CONCURRENT_PREFIX)
        .or_else(|| config.strip_prefix(CONCURRENT_PREFIX))
        .unwrap_or(config);

    // collapse runs of underscores
    let mut cleaned = String::with_capacity(config.len());
    for c in config.chars() {
        if c == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.trim_matches('_').to_string()
}

/// Computes the policy variant of a (policy, config) pair, e.g. `LRU` with
/// `concurrent_relaxed` is `LRU_relaxed`. All device-aware configs collapse
/// into a single `device_aware` variant.
pub fn policy_variant(policy: &str, config: &str) -> String {
    if config.starts_with(DEVICE_AWARE) {
        return DEVICE_AWARE.to_string();
    }
    format!("{}_{}", policy, clean_config_name(config))
}

/// Whether the variant is the device-aware one.
pub fn is_device_aware(variant: &str) -> bool {
    variant == DEVICE_AWARE
}
