mod global {
    turf::style_sheet!("assets/global.css");
}

mod chart {
    turf::style_sheet!("assets/chart.css");
}

pub use chart::ClassName as Chart;

use std::sync::LazyLock;

pub static ALL: LazyLock<String> =
    LazyLock::new(|| [global::STYLE_SHEET, chart::STYLE_SHEET].join("\n"));
