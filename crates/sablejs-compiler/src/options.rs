//! Lowering configuration.

/// Names used in generated script.
///
/// The runtime helpers are referenced by name only; their implementation
/// lives in the script runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringOptions {
    temp_prefix: String,
    clone: String,
    shallow_copy: String,
    multidim_get: String,
    multidim_set: String,
    call_base: String,
    default_value: String,
    by_ref_field: String,
}

impl LoweringOptions {
    pub fn new() -> Self {
        Self {
            temp_prefix: "$tmp".to_string(),
            clone: "$Clone".to_string(),
            shallow_copy: "$ShallowCopy".to_string(),
            multidim_get: "$MultidimArrayGet".to_string(),
            multidim_set: "$MultidimArraySet".to_string(),
            call_base: "$CallBase".to_string(),
            default_value: "$Default".to_string(),
            by_ref_field: "$".to_string(),
        }
    }

    pub fn with_temp_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    pub fn with_clone_intrinsic<S: Into<String>>(mut self, name: S) -> Self {
        self.clone = name.into();
        self
    }

    pub fn with_shallow_copy_intrinsic<S: Into<String>>(mut self, name: S) -> Self {
        self.shallow_copy = name.into();
        self
    }

    pub fn with_multidim_intrinsics<G: Into<String>, S: Into<String>>(mut self, get: G, set: S) -> Self {
        self.multidim_get = get.into();
        self.multidim_set = set.into();
        self
    }

    pub fn with_call_base_intrinsic<S: Into<String>>(mut self, name: S) -> Self {
        self.call_base = name.into();
        self
    }

    pub fn with_default_intrinsic<S: Into<String>>(mut self, name: S) -> Self {
        self.default_value = name.into();
        self
    }

    /// Field holding the value of a by-reference cell (`cell.$`).
    pub fn with_by_ref_field<S: Into<String>>(mut self, name: S) -> Self {
        self.by_ref_field = name.into();
        self
    }

    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    pub fn clone_intrinsic(&self) -> &str {
        &self.clone
    }

    pub fn shallow_copy_intrinsic(&self) -> &str {
        &self.shallow_copy
    }

    pub fn multidim_get_intrinsic(&self) -> &str {
        &self.multidim_get
    }

    pub fn multidim_set_intrinsic(&self) -> &str {
        &self.multidim_set
    }

    pub fn call_base_intrinsic(&self) -> &str {
        &self.call_base
    }

    pub fn default_intrinsic(&self) -> &str {
        &self.default_value
    }

    pub fn by_ref_field(&self) -> &str {
        &self.by_ref_field
    }
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self::new()
    }
}
