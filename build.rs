//! Stamps the build date and time into `SCIVIEW_BUILD_DATE`/`SCIVIEW_BUILD_TIME`.
//! Either can be pinned from the environment for reproducible builds.

use time::format_description::{self, FormatItem};
use time::OffsetDateTime;

const STAMPS: [(&str, &str); 2] = [
    ("SCIVIEW_BUILD_DATE", "[year]-[month]-[day]"),
    ("SCIVIEW_BUILD_TIME", "[hour]:[minute] UTC"),
];

fn render(now: OffsetDateTime, pattern: &str) -> Option<String> {
    let items: Vec<FormatItem<'_>> = format_description::parse(pattern).ok()?;
    now.format(&items).ok()
}

fn main() {
    let now = OffsetDateTime::now_utc();
    for (var, pattern) in STAMPS {
        println!("cargo:rerun-if-env-changed={}", var);
        let value = std::env::var(var)
            .ok()
            .or_else(|| render(now, pattern))
            .unwrap_or_else(|| "unknown".to_string());
        println!("cargo:rustc-env={}={}", var, value);
    }
}
