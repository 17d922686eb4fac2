/// Controls how settings profiles are loaded from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Maximum bytes allowed for a profile file.
    pub max_profile_size: u64,
    /// When true, values are range-checked immediately after parsing.
    pub validate_on_load: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_profile_size: 64 * 1024,
            validate_on_load: true,
        }
    }
}
