//! Static barcode to title table, consulted after every network source.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::UpcSource;

/// Barcodes known to be missing or wrong in the public databases.
const BUILTIN_OVERRIDES: &[(&str, &str)] = &[("043396275294", "Casino Royale")];

pub struct LocalOverrideSource {
    table: BTreeMap<String, String>,
}

impl LocalOverrideSource {
    /// Only the built-in entries.
    pub fn builtin() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Built-in entries merged with `extra`; entries in `extra` win.
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut table: BTreeMap<String, String> = BUILTIN_OVERRIDES
            .iter()
            .map(|(code, title)| (code.to_string(), title.to_string()))
            .collect();
        table.extend(
            extra
                .iter()
                .map(|(code, title)| (code.trim().to_string(), title.clone())),
        );
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl UpcSource for LocalOverrideSource {
    fn label(&self) -> &str {
        "local_override"
    }

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>> {
        Ok(self.table.get(barcode.trim()).cloned())
    }
}
