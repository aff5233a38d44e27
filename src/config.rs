// config.rs — 命令行 / 环境变量配置

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "globe_viewer", about = "Interactive 3D globe with preset camera views")]
pub struct Config {
    /// UI language code (en, zh-Hans)
    #[arg(long, env = "GLOBE_LANG", default_value = crate::i18n::FALLBACK_LANG)]
    pub lang: String,

    /// Equirectangular Earth image to load at startup
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    pub no_vsync: bool,
}

impl Config {
    pub fn vsync(&self) -> bool {
        !self.no_vsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::try_parse_from(["globe_viewer", "--lang", "en"]).unwrap();
        assert_eq!(c.lang, "en");
        assert!(c.texture.is_none());
        assert!(c.vsync());
    }

    #[test]
    fn all_flags() {
        let c = Config::try_parse_from([
            "globe_viewer",
            "--lang",
            "zh-Hans",
            "--texture",
            "earth.jpg",
            "--no-vsync",
        ])
        .unwrap();
        assert_eq!(c.lang, "zh-Hans");
        assert_eq!(c.texture, Some(PathBuf::from("earth.jpg")));
        assert!(!c.vsync());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Config::try_parse_from(["globe_viewer", "--zoom"]).is_err());
    }
}
