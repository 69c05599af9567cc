use std::io::{self, Write};

use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// `LEVEL message`, coloured by level. Debug and trace lines also carry the
/// emitting module.
pub fn cli_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    let level = record.level();
    let tag = style(level).paint(format!("{level:<5}"));
    match level {
        Level::Debug | Level::Trace => write!(
            w,
            "{tag} [{}] {}",
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        ),
        _ => write!(w, "{tag} {}", record.args()),
    }
}
