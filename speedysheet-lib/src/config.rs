/// Knobs for the in-memory host environment that owns documents and sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// When false, `<style>` elements don't carry a reference to their sheet and
    /// lookups must go through the document's sheet list (what some engines do).
    pub expose_direct_sheet: bool,
    /// Drop invalid rules found in a `<style>` element's initial text instead of
    /// failing the whole document.
    pub recover_invalid_rules: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            expose_direct_sheet: true,
            recover_invalid_rules: true,
        }
    }
}

impl HostConfig {
    pub fn without_direct_sheet() -> Self {
        HostConfig {
            expose_direct_sheet: false,
            ..Self::default()
        }
    }
}
