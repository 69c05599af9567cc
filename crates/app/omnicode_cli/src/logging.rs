pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// `RUST_LOG` wins when set; otherwise the level follows `-v`.
pub fn init(verbose: u8) -> Result<(), Error> {
    Logger::try_with_env_or_str(default_spec(verbose))?
        .format(formats::cli_format)
        .log_to_stdout()
        .start()?;

    Ok(())
}

/// HTTP internals stay at `info` unless asked for with `RUST_LOG`.
fn default_spec(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug, hyper_util=info, reqwest=info",
        _ => "trace, hyper=info, hyper_util=info, reqwest=info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_logger::LogSpecification;

    #[test]
    fn verbosity_raises_the_default_level() {
        for v in 0..=3 {
            assert!(LogSpecification::parse(default_spec(v)).is_ok());
        }
        assert_eq!(default_spec(0), "info");
        assert!(default_spec(1).starts_with("debug"));
        assert!(default_spec(5).starts_with("trace"));
    }
}
