// fonts.rs — 选择能显示中日韩文字的系统字体
//
// egui 自带字体不含 CJK。依次搜索系统字体目录和 ./assets，
// 第一个能被 ab_glyph 解析的文件作为 Proportional / Monospace 首选字体。
// .ttc 也会尝试，ab_glyph 不支持的会自动跳过。

use std::path::{Path, PathBuf};

const ASSET_FONTS: [&str; 4] = [
    "NotoSansSC-Regular.otf",
    "NotoSansSC-Regular.ttf",
    "NotoSansCJK-Regular.ttc",
    "NotoSans-Regular.ttf",
];

fn system_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();

    if cfg!(windows) {
        let dir = PathBuf::from(r"C:\Windows\Fonts");
        for f in ["msyh.ttf", "simhei.ttf", "Deng.ttf", "simsun.ttf", "arial.ttf"] {
            out.push(dir.join(f));
        }
    } else if cfg!(target_os = "macos") {
        for f in [
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/Hiragino Sans GB.ttc",
            "/System/Library/Fonts/STHeiti Light.ttc",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/Library/Fonts/NotoSansSC-Regular.otf",
        ] {
            out.push(PathBuf::from(f));
        }
    } else if cfg!(unix) {
        for f in [
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansSC-Regular.otf",
            "/usr/share/fonts/truetype/noto/NotoSansSC-Regular.ttf",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        ] {
            out.push(PathBuf::from(f));
        }
        if let Ok(home) = std::env::var("HOME") {
            let home = PathBuf::from(home);
            out.push(home.join(".local/share/fonts/NotoSansSC-Regular.ttf"));
            out.push(home.join(".fonts/NotoSansSC-Regular.ttf"));
        }
    }

    out
}

fn asset_candidates() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = std::env::current_exe().ok().and_then(|e| e.parent().map(|p| p.to_path_buf())) {
        dirs.push(dir.join("assets"));
    }
    dirs.push(PathBuf::from("assets"));

    dirs.iter()
        .flat_map(|d| ASSET_FONTS.iter().map(move |f| d.join(f)))
        .collect()
}

fn load_font(path: &Path) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    ab_glyph::FontRef::try_from_slice(&bytes).ok()?;
    Some(bytes)
}

pub fn install_ui_fonts(ctx: &egui::Context) {
    let chosen = system_candidates()
        .into_iter()
        .chain(asset_candidates())
        .find_map(|p| load_font(&p).map(|bytes| (p, bytes)));

    let Some((font_path, font_bytes)) = chosen else {
        log::warn!("{}", crate::i18n::tr("font.not_found"));
        return;
    };

    log::info!(
        "{}",
        crate::i18n::tr_with("font.using", &[("path", font_path.display().to_string())])
    );

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("ui".to_owned(), egui::FontData::from_owned(font_bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.insert(0, "ui".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}
