use std::fmt;
use std::str::FromStr;

use log::LevelFilter;

use crate::error::Error;

/// Id of the drawing element the page provides.
pub const CANVAS_ID: &str = "mycanvas";

/// How a variant reaches the WebGL API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Method calls by name, enum values hard-coded.
    Dynamic,
    /// Method calls by name, enum values read off the context once.
    Cached,
    /// `web-sys` bindings.
    Typed,
    /// `glow` bindings.
    Glow,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Typed,
        Variant::Glow,
        Variant::Cached,
        Variant::Dynamic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Dynamic => "dynamic",
            Variant::Cached => "cached",
            Variant::Typed => "typed",
            Variant::Glow => "glow",
        }
    }

    pub fn is_enabled(self) -> bool {
        match self {
            Variant::Dynamic => cfg!(feature = "dynamic"),
            Variant::Cached => cfg!(feature = "cached"),
            Variant::Typed => cfg!(feature = "typed"),
            Variant::Glow => cfg!(feature = "glow"),
        }
    }

    /// First compiled-in variant, in `ALL` order.
    pub fn preferred() -> Option<Variant> {
        Variant::ALL.iter().copied().find(|v| v.is_enabled())
    }

    pub fn enabled() -> impl Iterator<Item = Variant> {
        Variant::ALL.iter().copied().filter(|v| v.is_enabled())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let variant = match s.trim().to_ascii_lowercase().as_str() {
            "dynamic" => Variant::Dynamic,
            "cached" => Variant::Cached,
            "typed" => Variant::Typed,
            "glow" => Variant::Glow,
            _ => return Err(Error::UnknownVariant(s.to_owned())),
        };
        if !variant.is_enabled() {
            return Err(Error::VariantDisabled(variant));
        }
        Ok(variant)
    }
}

/// Parses `off|error|warn|info|debug|trace`, case-insensitively.
pub fn parse_level(s: &str) -> Result<LevelFilter, Error> {
    s.trim()
        .parse::<LevelFilter>()
        .map_err(|_| Error::UnknownLevel(s.to_owned()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub canvas_id: String,
    /// `None` only when the crate was built with no variant feature.
    pub variant: Option<Variant>,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            canvas_id: CANVAS_ID.to_owned(),
            variant: Variant::preferred(),
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Applies the page's overrides, as read from the canvas `data-variant`
    /// and `data-log` attributes. Missing or empty values keep the default.
    pub fn with_overrides(
        mut self,
        variant: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<Self, Error> {
        if let Some(name) = variant.filter(|s| !s.trim().is_empty()) {
            self.variant = Some(name.parse()?);
        }
        if let Some(level) = log_level.filter(|s| !s.trim().is_empty()) {
            self.log_level = parse_level(level)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.canvas_id, "mycanvas");
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.variant, Variant::preferred());
    }

    #[test]
    fn parse_variants() {
        for variant in Variant::enabled() {
            assert_eq!(variant.name().parse::<Variant>(), Ok(variant));
            assert_eq!(
                variant.name().to_uppercase().parse::<Variant>(),
                Ok(variant)
            );
        }
        assert_eq!(
            "webgpu".parse::<Variant>(),
            Err(Error::UnknownVariant("webgpu".to_owned()))
        );
    }

    #[test]
    fn overrides() {
        let config = Config::default()
            .with_overrides(Some(""), Some("debug"))
            .unwrap();
        assert_eq!(config.variant, Variant::preferred());
        assert_eq!(config.log_level, LevelFilter::Debug);

        if let Some(last) = Variant::enabled().last() {
            let config = Config::default()
                .with_overrides(Some(last.name()), None)
                .unwrap();
            assert_eq!(config.variant, Some(last));
        }

        assert_eq!(
            Config::default().with_overrides(None, Some("loud")),
            Err(Error::UnknownLevel("loud".to_owned()))
        );
    }
}
