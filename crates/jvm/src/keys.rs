/// Reserved key under which each record carries its launcher path.
pub const PATH_KEY: &str = "java.path";

pub const DEFAULT_PROPERTIES: [&str; 11] = [
    "java.version",
    "java.runtime.version",
    "java.vendor",
    "java.vendor.version",
    "java.vm.name",
    "java.vm.version",
    "java.home",
    "os.arch",
    "os.name",
    "os.version",
    "sun.arch.data.model",
];

/// Requested property keys, in the order records should list them.
///
/// Duplicates and empty keys are dropped; the first occurrence keeps its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKeys {
    keys: Vec<String>,
}

impl PropertyKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !key.is_empty() && !ordered.contains(&key) {
                ordered.push(key);
            }
        }
        Self { keys: ordered }
    }

    /// The requested keys, or the default set when none were requested.
    pub fn or_defaults(keys: Vec<String>) -> Self {
        if keys.is_empty() {
            Self::default()
        } else {
            Self::new(keys)
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_occurrence_order() {
        let keys = PropertyKeys::new(["os.arch", "java.version", "os.arch", "", "java.home"]);
        assert_eq!(
            keys.iter().collect::<Vec<_>>(),
            vec!["os.arch", "java.version", "java.home"]
        );
    }

    #[test]
    fn empty_request_falls_back_to_defaults() {
        let keys = PropertyKeys::or_defaults(Vec::new());
        assert_eq!(keys.len(), 11);
        assert!(keys.contains("sun.arch.data.model"));
        assert!(!keys.contains(PATH_KEY));
    }
}
